pub mod edge;
pub mod response;
pub mod session_gate;

pub use edge::{edge_interceptor, is_excluded, PATHNAME_HEADER};
pub use response::ApiResponse;
pub use session_gate::session_gate;
