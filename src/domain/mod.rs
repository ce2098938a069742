mod charge;
mod ledger;
mod messaging;
mod money;
mod payment;
mod period;
mod schedule;
mod student;

pub use charge::*;
pub use ledger::*;
pub use messaging::*;
pub use money::*;
pub use payment::*;
pub use period::*;
pub use schedule::*;
pub use student::*;
