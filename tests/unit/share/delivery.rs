use super::*;

use std::sync::Mutex;

struct FixedShare {
    result: Result<(), ShareError>,
    seen: std::sync::Arc<Mutex<Vec<String>>>,
}

impl NativeShare for FixedShare {
    fn can_share(&self, _payload: &SharePayload) -> bool {
        true
    }

    fn share(&self, payload: &SharePayload) -> Result<(), ShareError> {
        self.seen.lock().unwrap().push(payload.file_name.clone());
        self.result.clone()
    }
}

fn payload() -> SharePayload {
    let data = ReelInput {
        user_name: Some("Ada".to_string()),
        ..ReelInput::default()
    };
    SharePayload::for_reel(&data, Blob::new("video/webm", vec![1, 2, 3]), 1_700_000_000_000)
}

#[test]
fn file_name_uses_millis_and_extension() {
    let gif = Blob::new("image/gif", vec![0]);
    assert_eq!(export_file_name(&gif, 42), "prompt2wrapped_42.gif");
    let mp4 = Blob::new("video/mp4", vec![0]);
    assert_eq!(export_file_name(&mp4, 7), "prompt2wrapped_7.mp4");
}

#[test]
fn payload_text_falls_back_without_tagline() {
    let p = payload();
    assert_eq!(p.title, "Ada's Prompt2Wrapped");
    assert_eq!(p.text, DEFAULT_SHARE_TEXT);
    assert_eq!(p.file_name, "prompt2wrapped_1700000000000.webm");

    let data = ReelInput {
        tagline: Some("Shipped it".to_string()),
        ..ReelInput::default()
    };
    let p = SharePayload::for_reel(&data, Blob::new("image/gif", vec![1]), 1);
    assert_eq!(p.title, "My Prompt2Wrapped");
    assert_eq!(p.text, "Shipped it");
}

#[test]
fn download_without_share_target() {
    let dir = tempfile::tempdir().unwrap();
    let delivery = Delivery::to_dir(dir.path().join("out"));
    let outcome = delivery.deliver(&payload()).unwrap();
    let DeliveryOutcome::Downloaded(path) = outcome else {
        panic!("expected a download, got {outcome:?}");
    };
    assert_eq!(std::fs::read(path).unwrap(), vec![1, 2, 3]);
}

#[test]
fn cancelled_share_is_not_an_error_and_skips_download() {
    let dir = tempfile::tempdir().unwrap();
    let seen = std::sync::Arc::new(Mutex::new(Vec::new()));
    let delivery = Delivery::to_dir(dir.path()).with_share(FixedShare {
        result: Err(ShareError::Cancelled),
        seen: seen.clone(),
    });
    assert_eq!(
        delivery.deliver(&payload()).unwrap(),
        DeliveryOutcome::Cancelled
    );
    assert_eq!(seen.lock().unwrap().len(), 1);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn failed_share_falls_back_to_download() {
    let dir = tempfile::tempdir().unwrap();
    let delivery = Delivery::to_dir(dir.path()).with_share(FixedShare {
        result: Err(ShareError::Failed("no target".to_string())),
        seen: Default::default(),
    });
    assert!(matches!(
        delivery.deliver(&payload()).unwrap(),
        DeliveryOutcome::Downloaded(_)
    ));
}

#[test]
fn successful_share_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let delivery = Delivery::to_dir(dir.path()).with_share(FixedShare {
        result: Ok(()),
        seen: Default::default(),
    });
    assert_eq!(delivery.deliver(&payload()).unwrap(), DeliveryOutcome::Shared);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn empty_blob_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let delivery = Delivery::to_dir(dir.path());
    let p = SharePayload::for_reel(&ReelInput::default(), Blob::new("image/gif", vec![]), 1);
    assert!(matches!(delivery.deliver(&p), Err(ReelError::Encoder(_))));
}

#[cfg(unix)]
#[test]
fn command_share_maps_exit_codes() {
    let p = payload();
    assert_eq!(CommandShare::new("true").share(&p), Ok(()));
    assert!(matches!(
        CommandShare::new("false").share(&p),
        Err(ShareError::Failed(_))
    ));
    let cancelled = CommandShare::new("sh").arg("-c").arg("exit 130");
    assert_eq!(cancelled.share(&p), Err(ShareError::Cancelled));
}
