//! 트랜잭션 메일
//!
//! # 모듈 구조
//!
//! - `model`: 요청/응답 타입과 입력 검증
//! - `provider`: 프로바이더 trait
//! - `mailgun`: Mailgun HTTP 구현
//! - `service`: 발송/조회/통계 로직과 `emails` 기록

pub mod mailgun;
pub mod model;
pub mod provider;
pub mod service;

pub use mailgun::MailgunProvider;
pub use model::SendMailRequest;
pub use provider::MailProvider;
pub use service::MailService;
