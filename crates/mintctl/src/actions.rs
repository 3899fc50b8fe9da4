//! Mutating actions and their outcome classification.
//!
//! Every mutating action follows the same shape: collect a guarded intent,
//! capture the settlement baseline, submit exactly one message, await
//! settlement, then re-read the observable and classify. There is no
//! automatic resubmission anywhere; a duplicate mint is worse than a manual
//! retry.

use crate::client::MinterApi;
use crate::console::Console;
use crate::guard::collect_distinct_intent;
use crate::poll::{await_settlement, PollPolicy, Settlement};
use anyhow::Result;
use minter_common::{
    ActionOutcome, Address, AdminChangeIntent, ContentCell, ContentChangeIntent, ContractRef,
    ControlError, MintIntent, TokenAmount, TxPosition,
};
use tracing::warn;

/// Everything one action invocation needs. Built per session; no hidden
/// globals.
pub struct ActionContext<'a> {
    pub api: &'a dyn MinterApi,
    pub console: &'a dyn Console,
    pub minter: &'a ContractRef,
    pub wallet: Option<&'a Address>,
    pub policy: PollPolicy,
}

/// `Applied` iff the observed post-supply equals pre-supply plus the minted
/// amount, exactly. Overflow of the expectation can never match a real
/// supply, so it classifies as no visible change.
pub fn classify_mint(pre: TokenAmount, amount: TokenAmount, post: TokenAmount) -> ActionOutcome {
    match pre.checked_add(amount) {
        Some(expected) if post == expected => ActionOutcome::Applied,
        _ => ActionOutcome::NoVisibleChange,
    }
}

pub fn classify_admin(expected: &Address, observed: &Address) -> ActionOutcome {
    if observed == expected {
        ActionOutcome::Applied
    } else {
        ActionOutcome::NoVisibleChange
    }
}

pub fn classify_content(expected: &ContentCell, observed: &ContentCell) -> ActionOutcome {
    if observed == expected {
        ActionOutcome::Applied
    } else {
        ActionOutcome::NoVisibleChange
    }
}

/// Reads the baseline position a settlement watch will compare against.
/// An administered minter always has at least its deployment transaction;
/// no history is a fatal precondition failure, reported before anything is
/// submitted.
async fn settlement_baseline(ctx: &ActionContext<'_>) -> Result<TxPosition> {
    let state = ctx.api.contract_state(&ctx.minter.address).await?;
    state
        .last_transaction
        .ok_or_else(|| ControlError::NoHistory(ctx.minter.address).into())
}

async fn wait_for_settlement(ctx: &ActionContext<'_>, baseline: &TxPosition) -> Result<Settlement> {
    ctx.console.start_wait("Waiting for transaction to settle...");
    let api = ctx.api;
    let address = ctx.minter.address;
    let settlement = await_settlement(baseline, &ctx.policy, move || async move {
        api.contract_state(&address)
            .await
            .map(|state| state.last_transaction)
    })
    .await;
    ctx.console.end_wait();
    Ok(settlement?)
}

fn report_indeterminate(console: &dyn Console) {
    warn!("settlement poll exhausted; outcome unknown");
    console.warn(
        "Failed to get indication of transaction completion from API!\n\
         Check result manually, or try again",
    );
}

/// Prints the bundled minter info; optionally expands the content cell.
pub async fn info_action(ctx: &ActionContext<'_>) -> Result<()> {
    let data = ctx.api.jetton_data(&ctx.minter.address).await?;
    ctx.console.write("Jetton info:\n");
    ctx.console.write(&format!("Admin: {}", data.admin));
    ctx.console
        .write(&format!("Total supply: {}", data.total_supply));
    ctx.console.write(&format!("Mintable: {}", data.mintable));
    if ctx.console.choose("Display content?", &["Yes", "No"])? == 0 {
        match data.content.url() {
            Some(url) => ctx.console.write(&format!("Content url: {url}")),
            None => ctx
                .console
                .write(&format!("Raw content: {}", hex::encode(data.content.as_bytes()))),
        }
    }
    Ok(())
}

fn collect_mint_intent(console: &dyn Console, fallback: &Address) -> Result<MintIntent> {
    loop {
        let to = console.prompt_address("Please specify address to mint to", Some(fallback))?;
        let amount = console.prompt_amount("Please provide mint amount in decimal form:")?;
        console.write(&format!("Mint {amount} tokens to {to}"));
        if console.confirm("Is it ok? (yes/no)")? {
            return Ok(MintIntent { to, amount });
        }
    }
}

pub async fn mint_action(ctx: &ActionContext<'_>) -> Result<ActionOutcome> {
    let fallback = match ctx.wallet {
        Some(wallet) => *wallet,
        None => ctx.api.admin_address(&ctx.minter.address).await?,
    };
    let intent = collect_mint_intent(ctx.console, &fallback)?;

    ctx.console
        .write(&format!("Minting {} to {}", intent.amount, intent.to));
    let pre_supply = ctx.api.total_supply(&ctx.minter.address).await?;
    let baseline = settlement_baseline(ctx).await?;

    ctx.api
        .send_mint(&ctx.minter.address, &intent.to, intent.amount)
        .await?;

    match wait_for_settlement(ctx, &baseline).await? {
        Settlement::Exhausted => {
            report_indeterminate(ctx.console);
            Ok(ActionOutcome::Unconfirmed)
        }
        Settlement::Confirmed => {
            let post_supply = ctx.api.total_supply(&ctx.minter.address).await?;
            let outcome = classify_mint(pre_supply, intent.amount, post_supply);
            match outcome {
                ActionOutcome::Applied => ctx
                    .console
                    .write(&format!("Mint successful!\nCurrent supply: {post_supply}")),
                _ => ctx.console.warn("Mint failed!"),
            }
            Ok(outcome)
        }
    }
}

pub async fn change_admin_action(ctx: &ActionContext<'_>) -> Result<ActionOutcome> {
    let api = ctx.api;
    let minter = ctx.minter.address;
    let new_admin = collect_distinct_intent(
        ctx.console,
        || ctx.console.prompt_address("Please specify new admin address:", None),
        move || async move { Ok(api.admin_address(&minter).await?) },
        |addr| format!("New admin address is going to be: {addr}\nKindly double check it!"),
        "Address specified matched current admin address!\nPlease pick another one.",
    )
    .await?;
    let intent = AdminChangeIntent { new_admin };

    let baseline = settlement_baseline(ctx).await?;
    ctx.api
        .send_change_admin(&ctx.minter.address, &intent.new_admin)
        .await?;

    match wait_for_settlement(ctx, &baseline).await? {
        Settlement::Exhausted => {
            report_indeterminate(ctx.console);
            Ok(ActionOutcome::Unconfirmed)
        }
        Settlement::Confirmed => {
            let observed = ctx.api.admin_address(&ctx.minter.address).await?;
            let outcome = classify_admin(&intent.new_admin, &observed);
            match outcome {
                ActionOutcome::Applied => ctx.console.write("Admin changed successfully"),
                _ => ctx
                    .console
                    .warn("Admin address hasn't changed!\nSomething went wrong!"),
            }
            Ok(outcome)
        }
    }
}

pub async fn change_content_action(ctx: &ActionContext<'_>) -> Result<ActionOutcome> {
    let api = ctx.api;
    let minter = ctx.minter.address;
    let new_content = collect_distinct_intent(
        ctx.console,
        || {
            ctx.console
                .prompt_url("Please specify new url pointing to jetton metadata (json):")
                .map(|url| ContentCell::from_url(&url))
        },
        move || async move { Ok(api.content(&minter).await?) },
        |cell| {
            format!(
                "New content url is going to be: {}\nKindly double check it!",
                cell.url().unwrap_or("<non-url content>")
            )
        },
        "Content url specified matched current content url!\nPlease pick another one.",
    )
    .await?;
    let intent = ContentChangeIntent { new_content };

    let baseline = settlement_baseline(ctx).await?;
    ctx.api
        .send_change_content(&ctx.minter.address, &intent.new_content)
        .await?;

    match wait_for_settlement(ctx, &baseline).await? {
        Settlement::Exhausted => {
            report_indeterminate(ctx.console);
            Ok(ActionOutcome::Unconfirmed)
        }
        Settlement::Confirmed => {
            let observed = ctx.api.content(&ctx.minter.address).await?;
            let outcome = classify_content(&intent.new_content, &observed);
            match outcome {
                ActionOutcome::Applied => ctx.console.write("Content changed successfully"),
                _ => ctx
                    .console
                    .warn("Content url hasn't changed!\nSomething went wrong!"),
            }
            Ok(outcome)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(s: &str) -> TokenAmount {
        s.parse().unwrap()
    }

    #[test]
    fn mint_applied_on_exact_supply_match() {
        assert_eq!(
            classify_mint(tokens("1000"), tokens("50"), tokens("1050")),
            ActionOutcome::Applied
        );
    }

    #[test]
    fn mint_no_visible_change_on_unchanged_supply() {
        assert_eq!(
            classify_mint(tokens("1000"), tokens("50"), tokens("1000")),
            ActionOutcome::NoVisibleChange
        );
    }

    #[test]
    fn mint_no_visible_change_on_partial_supply() {
        // Anything but the exact expected value fails; there is no tolerance.
        assert_eq!(
            classify_mint(tokens("1000"), tokens("50"), tokens("1049.999999999")),
            ActionOutcome::NoVisibleChange
        );
    }

    #[test]
    fn mint_expectation_overflow_never_applies() {
        let pre = TokenAmount::from_nano(u128::MAX);
        assert_eq!(
            classify_mint(pre, tokens("1"), pre),
            ActionOutcome::NoVisibleChange
        );
    }

    #[test]
    fn admin_classification_is_exact_identity() {
        let a: Address = format!("0:{}", "11".repeat(32)).parse().unwrap();
        let b: Address = format!("0:{}", "22".repeat(32)).parse().unwrap();
        assert_eq!(classify_admin(&a, &a), ActionOutcome::Applied);
        assert_eq!(classify_admin(&a, &b), ActionOutcome::NoVisibleChange);
    }

    #[test]
    fn content_classification_is_structural() {
        let a = ContentCell::from_url("https://a.example/meta.json");
        let b = ContentCell::from_url("https://b.example/meta.json");
        assert_eq!(
            classify_content(&a, &ContentCell::from_url("https://a.example/meta.json")),
            ActionOutcome::Applied
        );
        assert_eq!(classify_content(&a, &b), ActionOutcome::NoVisibleChange);
    }
}
