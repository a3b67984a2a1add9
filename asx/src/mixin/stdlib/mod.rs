//! Standard mixin modules

mod array;
mod file;
mod string;
mod time;
mod utils;

pub use array::ArrayModule;
pub use file::FileModule;
pub use string::StringModule;
pub use time::TimeModule;
pub use utils::UtilsModule;

use super::MixinModule;

/// Every built-in module, in load order
pub fn modules() -> Vec<Box<dyn MixinModule>> {
    vec![
        Box::new(ArrayModule),
        Box::new(StringModule),
        Box::new(FileModule),
        Box::new(UtilsModule),
        Box::new(TimeModule),
    ]
}
