pub(crate) mod confirm;
pub(crate) mod firmware_tree;
pub(crate) mod help;
pub(crate) mod modal;
pub(crate) mod spinner;
pub(crate) mod status_view;
pub(crate) mod text;
