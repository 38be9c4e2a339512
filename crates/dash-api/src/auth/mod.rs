//! 인증 및 권한 부여.
//!
//! JWT 기반 인증을 제공합니다.
//!
//! # 구성 요소
//!
//! - [`Claims`]: JWT 페이로드 구조체
//! - [`JwtAuth`]: Axum 핸들러용 JWT 검증 추출기
//! - 토큰 생성/검증 및 비밀번호 해싱 함수

mod jwt;
mod middleware;
mod password;

pub use jwt::{create_token, create_token_pair, decode_token, Claims, JwtError, TokenPair};
pub use middleware::{JwtAuth, JwtAuthError, JwtConfig};
pub use password::{hash_password, verify_password, PasswordError};
