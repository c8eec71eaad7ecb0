pub(crate) mod layer_tree;
pub(crate) mod scroll;
pub(crate) mod sync;
