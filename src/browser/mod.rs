//! 浏览器适配层
//!
//! 连接已有浏览器或启动新浏览器，返回 `(Browser, Page)`

pub mod connection;
pub mod headless;

pub use connection::connect_to_debugger;
pub use headless::launch_browser;
