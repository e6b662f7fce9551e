pub mod logging;
pub mod prompt;
pub mod url;
pub mod validation;
