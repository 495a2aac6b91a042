pub mod describe;
pub mod init;
pub mod run;
pub mod tasks;
pub mod vault;
