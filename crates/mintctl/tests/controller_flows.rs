//! End-to-end action and session flows against scripted fakes.
//!
//! Covers the settlement workflow from the operator's side: applied mints,
//! silently rejected mutations, exhausted polls, duplicate-intent rejection
//! and the role-restricted menu.

use mintctl::actions::{change_admin_action, change_content_action, mint_action, ActionContext};
use mintctl::poll::PollPolicy;
use mintctl::session::Session;
use mintctl::testkit::{Answer, FakeMinterApi, ScriptedConsole, Sent};
use minter_common::{
    ActionOutcome, Address, ContentCell, ContractRef, ContractState, ContractStatus, JettonData,
    TokenAmount, TxPosition,
};
use std::time::Duration;

fn addr(fill: u8) -> Address {
    Address {
        workchain: 0,
        account: [fill; 32],
    }
}

fn tokens(s: &str) -> TokenAmount {
    s.parse().unwrap()
}

fn active_state(lt: u64) -> ContractState {
    ContractState {
        status: ContractStatus::Active,
        code: Some(vec![0xb5, 0xee, 0x9c, 0x72]),
        last_transaction: Some(TxPosition::new(lt, format!("h{lt}"))),
    }
}

fn jetton(supply: &str, admin: Address, url: &str) -> JettonData {
    JettonData {
        total_supply: tokens(supply),
        mintable: true,
        admin,
        content: ContentCell::from_url(url),
    }
}

fn fast_policy() -> PollPolicy {
    PollPolicy {
        max_attempts: 10,
        interval: Duration::ZERO,
    }
}

fn ctx<'a>(
    api: &'a FakeMinterApi,
    console: &'a ScriptedConsole,
    minter: &'a ContractRef,
    wallet: Option<&'a Address>,
) -> ActionContext<'a> {
    ActionContext {
        api,
        console,
        minter,
        wallet,
        policy: fast_policy(),
    }
}

fn minter_ref() -> ContractRef {
    ContractRef {
        address: addr(0x77),
        code_hash: [0; 32],
    }
}

#[tokio::test]
async fn mint_applies_and_reports_new_supply() {
    let admin = addr(1);
    let receiver = addr(2);
    // Baseline at lt 100; the new transaction becomes visible on the second
    // poll read.
    let api = FakeMinterApi::new(
        vec![active_state(100), active_state(100), active_state(101)],
        vec![
            jetton("1000", admin, "https://t.example/meta.json"),
            jetton("1050", admin, "https://t.example/meta.json"),
        ],
    );
    let console = ScriptedConsole::new(vec![
        Answer::Address(receiver),
        Answer::Amount(tokens("50")),
        Answer::Confirm(true),
    ]);
    let minter = minter_ref();

    let outcome = mint_action(&ctx(&api, &console, &minter, Some(&admin)))
        .await
        .unwrap();

    assert_eq!(outcome, ActionOutcome::Applied);
    assert_eq!(
        api.sent(),
        vec![Sent::Mint {
            to: receiver,
            amount: tokens("50"),
        }]
    );
    // One baseline read plus two polls.
    assert_eq!(api.state_reads(), 3);
    assert!(console
        .transcript()
        .iter()
        .any(|line| line.contains("1050")));
}

#[tokio::test]
async fn mint_with_unchanged_supply_is_no_visible_change() {
    let admin = addr(1);
    let api = FakeMinterApi::new(
        vec![active_state(100), active_state(101)],
        vec![
            jetton("1000", admin, "https://t.example/meta.json"),
            jetton("1000", admin, "https://t.example/meta.json"),
        ],
    );
    let console = ScriptedConsole::new(vec![
        Answer::UseFallback,
        Answer::Amount(tokens("50")),
        Answer::Confirm(true),
    ]);
    let minter = minter_ref();

    let outcome = mint_action(&ctx(&api, &console, &minter, Some(&admin)))
        .await
        .unwrap();

    assert_eq!(outcome, ActionOutcome::NoVisibleChange);
    assert!(console
        .transcript()
        .iter()
        .any(|line| line.contains("Mint failed!")));
}

#[tokio::test]
async fn mint_without_history_aborts_before_submitting() {
    let admin = addr(1);
    let no_history = ContractState {
        status: ContractStatus::Active,
        code: Some(vec![0xb5]),
        last_transaction: None,
    };
    let api = FakeMinterApi::new(
        vec![no_history],
        vec![jetton("1000", admin, "https://t.example/meta.json")],
    );
    let console = ScriptedConsole::new(vec![
        Answer::UseFallback,
        Answer::Amount(tokens("50")),
        Answer::Confirm(true),
    ]);
    let minter = minter_ref();

    let err = mint_action(&ctx(&api, &console, &minter, Some(&admin)))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("no recorded transactions"));
    assert!(api.sent().is_empty());
}

#[tokio::test]
async fn duplicate_admin_intent_is_rejected_with_zero_submissions() {
    let current_admin = addr(1);
    let api = FakeMinterApi::new(
        vec![active_state(100)],
        vec![jetton("1000", current_admin, "https://t.example/meta.json")],
    );
    // The operator offers the current admin; the guard rejects it and
    // reprompts, at which point the script runs dry and the action aborts.
    let console = ScriptedConsole::new(vec![Answer::Address(current_admin)]);
    let minter = minter_ref();

    let result = change_admin_action(&ctx(&api, &console, &minter, Some(&current_admin))).await;

    assert!(result.is_err());
    assert!(api.sent().is_empty());
    assert_eq!(api.state_reads(), 0);
    assert!(console
        .transcript()
        .iter()
        .any(|line| line.contains("matched current admin address")));
}

#[tokio::test]
async fn exhausted_poll_reports_indeterminate_and_skips_the_post_read() {
    let current_admin = addr(1);
    let new_admin = addr(2);
    // Position never moves past the baseline.
    let api = FakeMinterApi::new(
        vec![active_state(100)],
        vec![jetton("1000", current_admin, "https://t.example/meta.json")],
    );
    let console = ScriptedConsole::new(vec![Answer::Address(new_admin), Answer::Confirm(true)]);
    let minter = minter_ref();

    let outcome = change_admin_action(&ctx(&api, &console, &minter, Some(&current_admin)))
        .await
        .unwrap();

    assert_eq!(outcome, ActionOutcome::Unconfirmed);
    assert_eq!(api.sent().len(), 1);
    // Baseline read plus exactly max_attempts polls.
    assert_eq!(api.state_reads(), 11);
    // The guard's distinctness read is the only minter read; no post-state
    // verification happened.
    assert_eq!(api.data_reads(), 1);
    assert!(console
        .transcript()
        .iter()
        .any(|line| line.contains("Check result manually")));
}

#[tokio::test]
async fn admin_change_applies_on_observed_rotation() {
    let current_admin = addr(1);
    let new_admin = addr(2);
    let api = FakeMinterApi::new(
        vec![active_state(100), active_state(101)],
        vec![
            jetton("1000", current_admin, "https://t.example/meta.json"),
            jetton("1000", new_admin, "https://t.example/meta.json"),
        ],
    );
    let console = ScriptedConsole::new(vec![Answer::Address(new_admin), Answer::Confirm(true)]);
    let minter = minter_ref();

    let outcome = change_admin_action(&ctx(&api, &console, &minter, Some(&current_admin)))
        .await
        .unwrap();

    assert_eq!(outcome, ActionOutcome::Applied);
    assert_eq!(api.sent(), vec![Sent::ChangeAdmin { new_admin }]);
    assert!(console
        .transcript()
        .iter()
        .any(|line| line.contains("Admin changed successfully")));
}

#[tokio::test]
async fn content_change_applies_on_observed_update() {
    let admin = addr(1);
    let new_url = "https://t.example/meta-v2.json";
    let api = FakeMinterApi::new(
        vec![active_state(100), active_state(101)],
        vec![
            jetton("1000", admin, "https://t.example/meta.json"),
            jetton("1000", admin, new_url),
        ],
    );
    let console = ScriptedConsole::new(vec![
        Answer::Url(new_url.to_string()),
        Answer::Confirm(true),
    ]);
    let minter = minter_ref();

    let outcome = change_content_action(&ctx(&api, &console, &minter, Some(&admin)))
        .await
        .unwrap();

    assert_eq!(outcome, ActionOutcome::Applied);
    assert_eq!(
        api.sent(),
        vec![Sent::ChangeContent {
            content: ContentCell::from_url(new_url),
        }]
    );
}

#[tokio::test]
async fn session_binds_and_quits() {
    let minter_addr = addr(9);
    let api = FakeMinterApi::new(vec![active_state(100)], vec![]);
    let console = ScriptedConsole::new(vec![Answer::Choice("Quit".to_string())]);

    Session {
        api: &api,
        console: &console,
        wallet: None,
        expected_code_hash: None,
        policy: fast_policy(),
        initial_target: Some(minter_addr),
    }
    .run()
    .await
    .unwrap();

    assert!(console
        .transcript()
        .iter()
        .any(|line| line.contains("minter admin")));
}

#[tokio::test]
async fn viewer_menu_offers_no_mutations() {
    let minter_addr = addr(9);
    let operator = addr(3);
    let real_admin = addr(1);
    let api = FakeMinterApi::new(
        vec![active_state(100)],
        vec![jetton("1000", real_admin, "https://t.example/meta.json")],
    );
    // A viewer trying to pick "Mint" is a script error: the menu never
    // offered it.
    let console = ScriptedConsole::new(vec![Answer::Choice("Mint".to_string())]);

    let result = Session {
        api: &api,
        console: &console,
        wallet: Some(operator),
        expected_code_hash: None,
        policy: fast_policy(),
        initial_target: Some(minter_addr),
    }
    .run()
    .await;

    assert!(result.is_err());
    assert!(api.sent().is_empty());
    assert!(console
        .transcript()
        .iter()
        .any(|line| line.contains("not admin")));
}

#[tokio::test]
async fn inactive_target_reprompts_for_another_address() {
    let first = addr(8);
    let second = addr(9);
    let uninitialized = ContractState {
        status: ContractStatus::Uninitialized,
        code: None,
        last_transaction: None,
    };
    let api = FakeMinterApi::new(vec![uninitialized, active_state(100)], vec![]);
    let console = ScriptedConsole::new(vec![
        Answer::Address(second),
        Answer::Choice("Quit".to_string()),
    ]);

    Session {
        api: &api,
        console: &console,
        wallet: None,
        expected_code_hash: None,
        policy: fast_policy(),
        initial_target: Some(first),
    }
    .run()
    .await
    .unwrap();

    assert!(console
        .transcript()
        .iter()
        .any(|line| line.contains("not active")));
    assert_eq!(api.state_reads(), 2);
}

#[tokio::test]
async fn code_mismatch_needs_an_explicit_override() {
    let minter_addr = addr(9);
    let api = FakeMinterApi::new(vec![active_state(100)], vec![]);
    // Declined override returns to target selection; the second pass accepts
    // the same address with the override.
    let console = ScriptedConsole::new(vec![
        Answer::Confirm(false),
        Answer::Address(minter_addr),
        Answer::Confirm(true),
        Answer::Choice("Quit".to_string()),
    ]);

    Session {
        api: &api,
        console: &console,
        wallet: None,
        expected_code_hash: Some([0xde; 32]),
        policy: fast_policy(),
        initial_target: Some(minter_addr),
    }
    .run()
    .await
    .unwrap();

    let transcript = console.transcript();
    assert!(transcript
        .iter()
        .any(|line| line.contains("differs from the expected minter version")));
    assert_eq!(api.state_reads(), 2);
}

#[tokio::test]
async fn info_is_available_to_everyone() {
    let minter_addr = addr(9);
    let operator = addr(3);
    let real_admin = addr(1);
    let api = FakeMinterApi::new(
        vec![active_state(100)],
        vec![jetton("12345", real_admin, "https://t.example/meta.json")],
    );
    let console = ScriptedConsole::new(vec![
        Answer::Choice("Info".to_string()),
        Answer::Choice("Yes".to_string()),
        Answer::Choice("Quit".to_string()),
    ]);

    Session {
        api: &api,
        console: &console,
        wallet: Some(operator),
        expected_code_hash: None,
        policy: fast_policy(),
        initial_target: Some(minter_addr),
    }
    .run()
    .await
    .unwrap();

    let transcript = console.transcript();
    assert!(transcript.iter().any(|line| line.contains("12345")));
    assert!(transcript
        .iter()
        .any(|line| line.contains("https://t.example/meta.json")));
}
