pub(crate) mod damage;
pub(crate) mod occlusion;
pub(crate) mod properties;
pub(crate) mod quads;
pub(crate) mod surface;
