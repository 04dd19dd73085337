pub mod extract;

pub use extract::{AppForm, AppJson, AppPath, AppQuery};
