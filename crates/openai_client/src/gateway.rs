//! Completion gateway - one user utterance in, one completion out
//!
//! The gateway owns the conversation window. Every `send` records the user
//! turn before the request is issued and records the assistant turn only when
//! a reply arrives, so a failed exchange leaves the user turn without a reply.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex as StdMutex, MutexGuard, PoisonError};

use chat_core::{Config, ConfigStatus, Conversation, Turn};
use chat_state::{ExchangeEvent, ExchangeState, StateMachine};
use log::{debug, info, warn};
use tokio::sync::Mutex;

use crate::api::client::HttpTransport;
use crate::api::models::{ChatCompletionRequest, ChatCompletionResponse};
use crate::client_trait::CompletionTransport;
use crate::error::{GatewayError, InitError};

pub const DEFAULT_SYSTEM_INSTRUCTION: &str =
    "You are a helpful and friendly assistant. Answer clearly and concisely.";

pub struct CompletionGateway<T: CompletionTransport = HttpTransport> {
    transport: T,
    model: String,
    system_instruction: String,
    conversation: Mutex<Conversation>,
    exchange: StdMutex<StateMachine>,
    in_flight: AtomicBool,
}

/// Holds the in-flight flag for the lifetime of one exchange.
///
/// Released on drop, so a cancelled `send` future frees the gateway too. An
/// exchange still awaiting its response at that point is marked cancelled.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
    exchange: &'a StdMutex<StateMachine>,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool, exchange: &'a StdMutex<StateMachine>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag, exchange })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut exchange = lock_exchange(self.exchange);
        if *exchange.state() == ExchangeState::AwaitingResponse {
            warn!("Exchange dropped before a response arrived");
            record(
                &mut exchange,
                ExchangeEvent::RequestFailed {
                    error: GatewayError::Cancelled.user_message(),
                },
            );
        }
        drop(exchange);
        self.flag.store(false, Ordering::Release);
    }
}

fn lock_exchange(exchange: &StdMutex<StateMachine>) -> MutexGuard<'_, StateMachine> {
    exchange.lock().unwrap_or_else(PoisonError::into_inner)
}

fn record(machine: &mut StateMachine, event: ExchangeEvent) {
    match machine.handle_event(event) {
        Ok(transition) => debug!("Exchange {:?} -> {:?}", transition.from, transition.to),
        Err(err) => warn!("Exchange state not updated: {}", err),
    }
}

impl CompletionGateway<HttpTransport> {
    /// Build an HTTP gateway, refusing to do so unless the config is ready.
    pub fn from_config(config: &Config) -> Result<Self, InitError> {
        let credentials = match config.status() {
            ConfigStatus::Ready(credentials) => credentials,
            status => return Err(InitError::NotConfigured(status)),
        };
        let transport = HttpTransport::new(credentials, config)?;
        Ok(Self::new(transport, config.model()))
    }
}

impl<T: CompletionTransport> CompletionGateway<T> {
    pub fn new(transport: T, model: impl Into<String>) -> Self {
        Self::with_conversation(transport, model, Conversation::new())
    }

    /// Use an explicitly constructed conversation, e.g. one with a custom window.
    pub fn with_conversation(
        transport: T,
        model: impl Into<String>,
        conversation: Conversation,
    ) -> Self {
        Self {
            transport,
            model: model.into(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            conversation: Mutex::new(conversation),
            exchange: StdMutex::new(StateMachine::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Send one user message and wait for the reply.
    ///
    /// Blank messages and calls made while another exchange is outstanding
    /// are rejected without touching the history.
    pub async fn send(&self, user_text: &str) -> Result<String, GatewayError> {
        if user_text.trim().is_empty() {
            return Err(GatewayError::EmptyMessage);
        }
        let _guard = InFlightGuard::acquire(&self.in_flight, &self.exchange).ok_or_else(|| {
            warn!("Rejected message: an exchange is already in flight");
            GatewayError::Busy
        })?;

        let request = {
            let mut conversation = self.conversation.lock().await;
            conversation.append(Turn::user(user_text));
            self.build_request(conversation.snapshot())
        };
        debug!(
            "Built completion request: model={}, messages={}",
            request.model,
            request.messages.len()
        );

        {
            let mut exchange = lock_exchange(&self.exchange);
            *exchange = StateMachine::new();
            record(&mut exchange, ExchangeEvent::RequestSent);
        }

        let outcome = self
            .transport
            .send_chat_completion_request(&request)
            .await
            .and_then(extract_reply);

        match outcome {
            Ok(reply) => {
                self.conversation
                    .lock()
                    .await
                    .append(Turn::assistant(reply.clone()));
                record(&mut lock_exchange(&self.exchange), ExchangeEvent::ReplyReceived);
                info!("Exchange delivered ({} chars)", reply.chars().count());
                Ok(reply)
            }
            Err(err) => {
                record(
                    &mut lock_exchange(&self.exchange),
                    ExchangeEvent::RequestFailed {
                        error: err.user_message(),
                    },
                );
                warn!("Exchange failed: {:?}", err);
                Err(err)
            }
        }
    }

    fn build_request(&self, history: Vec<Turn>) -> ChatCompletionRequest {
        ChatCompletionRequest::new(&self.model, &self.system_instruction, history)
    }

    /// Copy of the conversation, oldest turn first.
    pub async fn history(&self) -> Vec<Turn> {
        self.conversation.lock().await.snapshot()
    }

    /// Empty the conversation. Refused while an exchange is in flight, since
    /// its reply would otherwise land in the fresh history.
    pub async fn clear_history(&self) -> Result<(), GatewayError> {
        let _guard = InFlightGuard::acquire(&self.in_flight, &self.exchange).ok_or_else(|| {
            warn!("Rejected clear: an exchange is already in flight");
            GatewayError::Busy
        })?;
        self.conversation.lock().await.clear();
        info!("Conversation history cleared");
        Ok(())
    }

    /// State of the most recent exchange.
    pub fn exchange_state(&self) -> ExchangeState {
        lock_exchange(&self.exchange).state().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }
}

fn extract_reply(response: ChatCompletionResponse) -> Result<String, GatewayError> {
    response
        .first_content()
        .map(str::to_string)
        .ok_or_else(|| {
            GatewayError::MalformedResponse("no message content in the first choice".to_string())
        })
}
