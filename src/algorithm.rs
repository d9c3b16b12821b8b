mod sipp;
mod sippfocal;

pub use sipp::find_path;
pub use sippfocal::find_suboptimal_path;
