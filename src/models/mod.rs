pub mod account;
pub mod camp;
pub mod emergency;
pub mod enums;
pub mod medicine;
pub mod notification;
pub mod prescription;
pub mod worker;

pub use account::*;
pub use camp::*;
pub use emergency::*;
pub use medicine::*;
pub use notification::*;
pub use prescription::*;
pub use worker::*;
