pub(crate) mod page_scale;
pub(crate) mod scrollbar;
pub(crate) mod timing;
