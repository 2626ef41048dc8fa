/// Unix specific stuff
#[cfg(unix)]
pub mod unix;

#[cfg(unix)]
pub use self::unix::directories;
