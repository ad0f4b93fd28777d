// web server response handler modules
pub(crate) mod asset_view;
pub(crate) mod health;
