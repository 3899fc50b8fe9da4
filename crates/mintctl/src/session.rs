//! Session controller: target selection, code identity check, role
//! determination and the action loop.
//!
//! The whole session is a linear state machine; each state does its reads
//! and prompts, then names the next state. Reprompt paths go back to
//! `SelectTarget`, and `Quit` is the only way out of the action loop.

use crate::actions::{
    change_admin_action, change_content_action, info_action, mint_action, ActionContext,
};
use crate::client::MinterApi;
use crate::console::Console;
use crate::poll::PollPolicy;
use anyhow::Result;
use minter_common::{Address, ContractRef, ContractStatus, Role};
use sha2::{Digest, Sha256};
use tracing::info;

const ADMIN_ACTIONS: [&str; 5] = ["Mint", "Change admin", "Change content", "Info", "Quit"];
const VIEWER_ACTIONS: [&str; 2] = ["Info", "Quit"];

/// One operator session against one minter. Holds everything the actions
/// need; nothing lives in globals.
pub struct Session<'a> {
    pub api: &'a dyn MinterApi,
    pub console: &'a dyn Console,
    /// Operator wallet; `None` runs the session without a caller identity.
    pub wallet: Option<Address>,
    /// Expected sha2-256 of the deployed minter code. `None` skips the
    /// identity check.
    pub expected_code_hash: Option<[u8; 32]>,
    pub policy: PollPolicy,
    /// Seeds the first target prompt (e.g. from the command line).
    pub initial_target: Option<Address>,
}

enum Phase {
    SelectTarget,
    VerifyCode { address: Address, code: Vec<u8> },
    Bind { address: Address, code_hash: [u8; 32] },
    Run { minter: ContractRef, role: Role },
    Done,
}

impl<'a> Session<'a> {
    pub async fn run(mut self) -> Result<()> {
        let mut phase = Phase::SelectTarget;
        loop {
            phase = match phase {
                Phase::SelectTarget => self.select_target().await?,
                Phase::VerifyCode { address, code } => self.verify_code(address, code)?,
                Phase::Bind { address, code_hash } => self.bind(address, code_hash).await?,
                Phase::Run { minter, role } => self.action_loop(minter, role).await?,
                Phase::Done => return Ok(()),
            };
        }
    }

    async fn select_target(&mut self) -> Result<Phase> {
        let address = match self.initial_target.take() {
            Some(address) => address,
            None => self
                .console
                .prompt_address("Please enter minter address:", None)?,
        };
        let state = self.api.contract_state(&address).await?;
        match (state.status, state.code) {
            (ContractStatus::Active, Some(code)) => Ok(Phase::VerifyCode { address, code }),
            _ => {
                self.console.warn(
                    "This contract is not active!\nPlease use another address, or deploy it first",
                );
                Ok(Phase::SelectTarget)
            }
        }
    }

    fn verify_code(&self, address: Address, code: Vec<u8>) -> Result<Phase> {
        let code_hash: [u8; 32] = Sha256::digest(&code).into();
        match self.expected_code_hash {
            Some(expected) if expected != code_hash => {
                self.console
                    .warn("Contract code differs from the expected minter version!");
                if self.console.confirm("Use this address anyway? (yes/no)")? {
                    Ok(Phase::Bind { address, code_hash })
                } else {
                    Ok(Phase::SelectTarget)
                }
            }
            _ => Ok(Phase::Bind { address, code_hash }),
        }
    }

    async fn bind(&self, address: Address, code_hash: [u8; 32]) -> Result<Phase> {
        let minter = ContractRef { address, code_hash };
        let role = match &self.wallet {
            None => Role::Admin,
            Some(wallet) => {
                let admin = self.api.admin_address(&address).await?;
                Role::determine(Some(wallet), &admin)
            }
        };
        info!("session bound to {} as {:?}", address, role);
        match role {
            Role::Admin => self.console.write("Current wallet is the minter admin!"),
            Role::Viewer => self
                .console
                .write("Current wallet is not admin!\nAvailable actions restricted"),
        }
        Ok(Phase::Run { minter, role })
    }

    async fn action_loop(&self, minter: ContractRef, role: Role) -> Result<Phase> {
        let ctx = ActionContext {
            api: self.api,
            console: self.console,
            minter: &minter,
            wallet: self.wallet.as_ref(),
            policy: self.policy.clone(),
        };
        let actions: &[&str] = match role {
            Role::Admin => &ADMIN_ACTIONS,
            Role::Viewer => &VIEWER_ACTIONS,
        };
        loop {
            let choice = self.console.choose("Pick action:", actions)?;
            match actions[choice] {
                "Mint" => {
                    mint_action(&ctx).await?;
                }
                "Change admin" => {
                    change_admin_action(&ctx).await?;
                }
                "Change content" => {
                    change_content_action(&ctx).await?;
                }
                "Info" => info_action(&ctx).await?,
                "Quit" => return Ok(Phase::Done),
                _ => unreachable!("menu offers only known actions"),
            }
        }
    }
}
