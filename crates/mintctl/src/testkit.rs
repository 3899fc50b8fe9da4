//! Scripted fakes for exercising console flows without a terminal or a
//! gateway.
//!
//! `ScriptedConsole` replays canned operator answers and records everything
//! written back; `FakeMinterApi` serves queued contract states and minter
//! reads and captures every submission. Queues repeat their final entry so a
//! poll loop can keep reading an unchanged state.

use crate::client::{ApiError, ApiResult, MinterApi};
use crate::console::Console;
use async_trait::async_trait;
use minter_common::{Address, ContentCell, ContractState, JettonData, TokenAmount};
use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// One canned operator answer.
#[derive(Debug, Clone)]
pub enum Answer {
    Address(Address),
    /// Accept the prompt's fallback address.
    UseFallback,
    Amount(TokenAmount),
    Url(String),
    Confirm(bool),
    /// Menu selection by label.
    Choice(String),
}

/// Console fake fed from a fixed script.
pub struct ScriptedConsole {
    answers: Mutex<VecDeque<Answer>>,
    transcript: Mutex<Vec<String>>,
}

impl ScriptedConsole {
    pub fn new(answers: Vec<Answer>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            transcript: Mutex::new(Vec::new()),
        }
    }

    /// Everything written or warned so far, in order.
    pub fn transcript(&self) -> Vec<String> {
        self.transcript
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn record(&self, line: &str) {
        self.transcript
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(line.to_string());
    }

    fn next(&self, expecting: &str) -> io::Result<Answer> {
        self.answers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("script exhausted while expecting {expecting}"),
                )
            })
    }

    fn mismatch<T>(expecting: &str, got: Answer) -> io::Result<T> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("script mismatch: expecting {expecting}, got {got:?}"),
        ))
    }
}

impl Console for ScriptedConsole {
    fn write(&self, msg: &str) {
        self.record(msg);
    }

    fn warn(&self, msg: &str) {
        self.record(msg);
    }

    fn prompt_address(&self, prompt: &str, fallback: Option<&Address>) -> io::Result<Address> {
        match self.next(prompt)? {
            Answer::Address(addr) => Ok(addr),
            Answer::UseFallback => fallback.copied().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "no fallback to accept")
            }),
            other => Self::mismatch(prompt, other),
        }
    }

    fn prompt_amount(&self, prompt: &str) -> io::Result<TokenAmount> {
        match self.next(prompt)? {
            Answer::Amount(amount) => Ok(amount),
            other => Self::mismatch(prompt, other),
        }
    }

    fn prompt_url(&self, prompt: &str) -> io::Result<String> {
        match self.next(prompt)? {
            Answer::Url(url) => Ok(url),
            other => Self::mismatch(prompt, other),
        }
    }

    fn confirm(&self, prompt: &str) -> io::Result<bool> {
        match self.next(prompt)? {
            Answer::Confirm(yes) => Ok(yes),
            other => Self::mismatch(prompt, other),
        }
    }

    fn choose(&self, prompt: &str, options: &[&str]) -> io::Result<usize> {
        match self.next(prompt)? {
            Answer::Choice(label) => options
                .iter()
                .position(|opt| *opt == label)
                .ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("option '{label}' not offered (menu: {options:?})"),
                    )
                }),
            other => Self::mismatch(prompt, other),
        }
    }
}

/// A submission captured by the fake gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Mint { to: Address, amount: TokenAmount },
    ChangeAdmin { new_admin: Address },
    ChangeContent { content: ContentCell },
}

/// `MinterApi` fake fed from queued responses.
pub struct FakeMinterApi {
    states: Mutex<VecDeque<ContractState>>,
    data: Mutex<VecDeque<JettonData>>,
    sent: Mutex<Vec<Sent>>,
    state_reads: AtomicU32,
    data_reads: AtomicU32,
}

impl FakeMinterApi {
    pub fn new(states: Vec<ContractState>, data: Vec<JettonData>) -> Self {
        Self {
            states: Mutex::new(states.into()),
            data: Mutex::new(data.into()),
            sent: Mutex::new(Vec::new()),
            state_reads: AtomicU32::new(0),
            data_reads: AtomicU32::new(0),
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Number of `contract_state` reads so far (baseline read + polls).
    pub fn state_reads(&self) -> u32 {
        self.state_reads.load(Ordering::SeqCst)
    }

    /// Number of `jetton_data` reads so far (guard re-fetches + post-state
    /// verification).
    pub fn data_reads(&self) -> u32 {
        self.data_reads.load(Ordering::SeqCst)
    }

    fn next_from<T: Clone>(queue: &Mutex<VecDeque<T>>, what: &str) -> ApiResult<T> {
        let mut queue = queue.lock().unwrap_or_else(|e| e.into_inner());
        let value = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        value.ok_or_else(|| ApiError::Decode(format!("fake has no {what} queued")))
    }

    fn capture(&self, message: Sent) {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message);
    }
}

#[async_trait]
impl MinterApi for FakeMinterApi {
    async fn contract_state(&self, _address: &Address) -> ApiResult<ContractState> {
        self.state_reads.fetch_add(1, Ordering::SeqCst);
        Self::next_from(&self.states, "contract state")
    }

    async fn jetton_data(&self, _minter: &Address) -> ApiResult<JettonData> {
        self.data_reads.fetch_add(1, Ordering::SeqCst);
        Self::next_from(&self.data, "jetton data")
    }

    async fn send_mint(
        &self,
        _minter: &Address,
        to: &Address,
        amount: TokenAmount,
    ) -> ApiResult<()> {
        self.capture(Sent::Mint { to: *to, amount });
        Ok(())
    }

    async fn send_change_admin(&self, _minter: &Address, new_admin: &Address) -> ApiResult<()> {
        self.capture(Sent::ChangeAdmin {
            new_admin: *new_admin,
        });
        Ok(())
    }

    async fn send_change_content(
        &self,
        _minter: &Address,
        content: &ContentCell,
    ) -> ApiResult<()> {
        self.capture(Sent::ChangeContent {
            content: content.clone(),
        });
        Ok(())
    }
}
