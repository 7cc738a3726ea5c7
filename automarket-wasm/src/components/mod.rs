pub(crate) mod advanced_filters;
pub(crate) mod cars_page;
pub(crate) mod company_admin;
pub(crate) mod field_control;
pub(crate) mod filters_bar;
pub(crate) mod image_upload;
