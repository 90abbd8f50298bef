//! Gateway infrastructure - MultiBaas REST client, envelope discrimination
//! and numeric decoding

mod client;
mod envelope;
mod numeric;

pub use client::{Gateway, HttpGateway};
pub use envelope::{
    discriminate, EventDetail, EventInput, EventTransaction, GatewayEvent, METHOD_CALL_KIND,
    TRANSACTION_TO_SIGN_KIND,
};
pub use numeric::decode_unsigned_integer;
