#[cfg(not(target_os = "linux"))]
std::compile_error!("linux is the only target os that was tested");

pub mod error;
pub mod interrupt;
pub mod logger;
pub mod port;
pub mod report;
pub mod resolver;
pub mod scan;
