// SPDX-License-Identifier: MIT OR Apache-2.0

//! Xionghan Network - client side of the remote game service
//!
//! This crate provides:
//! - A typed HTTP client for the new-game, state, play and AI-move endpoints
//! - Session persistence (game id and move counter) with legacy-key cleanup
//! - The `GameClient` controller that keeps board, selection and session in step
//! - The self-play orchestrator with pause/resume/stop
//! - TOML client configuration

#![deny(unsafe_code)]

pub mod api;
pub mod client;
pub mod config;
pub mod dto;
pub mod error;
pub mod events;
pub mod selfplay;
pub mod session;

pub use api::{AiOutcome, AiStats, GameApi, GameSnapshot, HttpGameApi, NewGame};
pub use client::{AiMoveResult, GameClient, PlayOutcome};
pub use config::{AiMoveSettings, Algorithm, ClientConfig, SelfPlayConfig, SideParams};
pub use dto::{AiMoveRequest, Search};
pub use error::ApiError;
pub use events::{ClientEvent, SelfPlayEvent};
pub use selfplay::{FinishReason, SelfPlay, SelfPlayError, SelfPlayHandle, Tick};
pub use session::{FileStore, MemoryStore, Session, SessionError, SessionManager, SessionStore};
