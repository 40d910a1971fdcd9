//! Payment submission across both signing channels.

mod common;

use std::sync::Arc;

use common::*;
use soltix_wallet::chain::{ChainGateway, Cluster};
use soltix_wallet::config::AppConfig;
use soltix_wallet::wallet::channel::{DeepLinkChannel, ExtensionChannel, SigningChannel};
use soltix_wallet::wallet::detector::{ProviderCallError, ProviderDetector};
use soltix_wallet::wallet::{PaymentOrchestrator, WalletError};

fn extension(ext: Arc<MockExtension>) -> Arc<dyn SigningChannel> {
    Arc::new(ExtensionChannel::new(
        ProviderDetector::new(Arc::new(MockHost::with("phantom.solana", ext))),
        vec!["Phantom".into()],
        Arc::new(RecordingLinker::default()),
    ))
}

#[tokio::test]
async fn test_invalid_inputs_make_no_calls() {
    let chain = Arc::new(MockChain::new(1.0));
    let ext = Arc::new(MockExtension::phantom());
    let payments = PaymentOrchestrator::new(chain.clone(), extension(ext.clone()));

    for (from, to, amount) in [
        (ALICE, BOB, -5.0),
        (ALICE, BOB, f64::NAN),
        (ALICE, BOB, 0.0),
        (ALICE, BOB, f64::INFINITY),
        (ALICE, BOB, 1e-10),
        ("", BOB, 1.0),
        (ALICE, "  ", 1.0),
        ("not-an-address", BOB, 1.0),
    ] {
        let err = payments.send_payment(from, to, amount).await.unwrap_err();
        assert!(matches!(err, WalletError::Validation(_)), "{} {} {}: {:?}", from, to, amount, err);
    }
    assert_eq!(chain.calls(), 0);
    assert!(ext.signed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_extension_payment_confirms_with_build_blockhash() {
    let chain = Arc::new(MockChain::new(1.0));
    let ext = Arc::new(MockExtension::phantom());
    let payments = PaymentOrchestrator::new(chain.clone(), extension(ext.clone()));

    let result = payments.send_payment(ALICE, BOB, 0.1).await.unwrap();
    assert_eq!(result.signature, SIGNATURE);
    assert!(result.success);
    assert!(!result.pending);
    assert_eq!(result.confirmed, Some(true));

    let signed = ext.signed.lock().unwrap();
    assert_eq!(signed.len(), 1);
    assert_eq!(signed[0].lamports, 100_000_000);
    assert_eq!(
        *chain.confirmed_with.lock().unwrap(),
        Some((SIGNATURE.to_string(), BLOCKHASH.to_string(), 150))
    );
}

#[tokio::test]
async fn test_unconfirmed_broadcast_keeps_success() {
    let mut chain = MockChain::new(1.0);
    chain.confirms = false;
    let payments = PaymentOrchestrator::new(Arc::new(chain), extension(Arc::new(MockExtension::phantom())));

    let result = payments.send_payment(ALICE, BOB, 1.0).await.unwrap();
    assert!(result.success);
    assert_eq!(result.confirmed, Some(false));
}

#[tokio::test]
async fn test_rejected_signature() {
    let chain = Arc::new(MockChain::new(1.0));
    let mut ext = MockExtension::phantom();
    ext.signature = Err(ProviderCallError::rejected());
    let payments = PaymentOrchestrator::new(chain.clone(), extension(Arc::new(ext)));

    let err = payments.send_payment(ALICE, BOB, 1.0).await.unwrap_err();
    assert!(matches!(err, WalletError::UserRejected));
    assert!(chain.confirmed_with.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_provider_failure_is_payment_failed() {
    let mut ext = MockExtension::phantom();
    ext.signature = Err(ProviderCallError { code: Some(-32603), message: "Internal error".into() });
    let payments = PaymentOrchestrator::new(Arc::new(MockChain::new(1.0)), extension(Arc::new(ext)));

    let err = payments.send_payment(ALICE, BOB, 1.0).await.unwrap_err();
    assert!(matches!(err, WalletError::PaymentFailed(_)));
}

#[tokio::test]
async fn test_rpc_failure_is_payment_failed() {
    let gateway = ChainGateway::new(chain_config(dead_endpoint().await)).unwrap();
    let payments = PaymentOrchestrator::new(Arc::new(gateway), extension(Arc::new(MockExtension::phantom())));

    let err = payments.send_payment(ALICE, BOB, 1.0).await.unwrap_err();
    assert!(matches!(err, WalletError::PaymentFailed(_)));
}

#[tokio::test]
async fn test_mobile_payment_is_pending() {
    let (addr, calls) = start_rpc_backend(healthy_node).await;
    let gateway = ChainGateway::new(chain_config(addr)).unwrap();
    let linker = Arc::new(RecordingLinker::default());
    let channel = Arc::new(DeepLinkChannel::new(linker.clone(), AppConfig::default(), Cluster::Devnet));
    let payments = PaymentOrchestrator::new(Arc::new(gateway), channel);

    let result = payments.send_payment(ALICE, BOB, 0.5).await.unwrap();
    assert_eq!(result.signature, "");
    assert!(!result.success);
    assert!(result.pending);
    assert_eq!(result.confirmed, None);

    let opened = linker.opened();
    assert_eq!(opened.len(), 1);
    assert!(opened[0].starts_with("https://phantom.app/ul/v1/signAndSendTransaction?transaction="));
    assert!(opened[0].contains("redirect_link=soltix%3A%2F%2FonSignTransaction"));
    assert_eq!(*calls.lock().unwrap(), vec!["getLatestBlockhash".to_string()]);
}

#[tokio::test]
async fn test_phantom_preferred_when_both_extensions_present() {
    let phantom = Arc::new(MockExtension::phantom());
    let solflare = Arc::new(MockExtension::solflare());
    let host = MockHost::with_many(vec![
        ("solflare", solflare.clone()),
        ("phantom.solana", phantom.clone()),
    ]);
    let channel = Arc::new(ExtensionChannel::new(
        ProviderDetector::new(Arc::new(host)),
        vec!["Phantom".into(), "Solflare".into()],
        Arc::new(RecordingLinker::default()),
    ));
    let payments = PaymentOrchestrator::new(Arc::new(MockChain::new(1.0)), channel);

    let result = payments.send_payment(ALICE, BOB, 0.2).await.unwrap();
    assert!(result.success);
    assert_eq!(phantom.signed_count(), 1);
    assert_eq!(solflare.signed_count(), 0);
}

#[tokio::test]
async fn test_solflare_signs_when_phantom_absent() {
    let solflare = Arc::new(MockExtension::solflare());
    let channel = Arc::new(ExtensionChannel::new(
        ProviderDetector::new(Arc::new(MockHost::with("solflare", solflare.clone()))),
        vec!["Phantom".into(), "Solflare".into()],
        Arc::new(RecordingLinker::default()),
    ));
    let payments = PaymentOrchestrator::new(Arc::new(MockChain::new(1.0)), channel);

    payments.send_payment(ALICE, BOB, 0.2).await.unwrap();
    assert_eq!(solflare.signed_count(), 1);
}
