pub mod flow;

pub use flow::{FlowError, SurfacedError, WithdrawalFlow, WithdrawalState};
