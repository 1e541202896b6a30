pub mod error;
pub mod mac;
pub mod net;
pub mod queue;
pub mod scenario;
pub mod sim;
pub mod topo;
pub mod trace;
pub mod traffic;

#[cfg(test)]
mod test;
