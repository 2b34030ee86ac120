//! # chatlink-network
//!
//! WebSocket/HTTP 네트워크 어댑터.
//! 채팅 서버와의 단일 WebSocket 세션([`ws_session`])과
//! 서버 가용성 점검([`server_probe`])을 담당한다.
//!
//! ## 사용 예시
//!
//! ```rust,ignore
//! use chatlink_network::ws_session::WsConnector;
//! use chatlink_network::server_probe::ServerProbe;
//! ```

pub mod server_probe;
pub mod ws_session;
