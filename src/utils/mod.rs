pub mod json_utils;
pub mod naming;
pub mod path_utils;

pub use json_utils::JsonUtils;
pub use naming::NamingUtils;
pub use path_utils::PathUtils;
