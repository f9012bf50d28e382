//! Static task descriptors, grouped by the toolkit command family they wrap.

pub mod post_process;
pub mod sun;
