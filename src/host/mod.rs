pub(crate) mod display;
pub(crate) mod viewer;
