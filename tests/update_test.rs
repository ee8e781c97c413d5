use anyhow::Result;
use spesa::application::{AppError, OpStatus};
use spesa::domain::{EntryPatch, EntryType, NewEntry};

mod common;
use common::{record, test_service};

#[tokio::test]
async fn test_update_note_changes_only_note() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let entry = NewEntry::new("2024-01-05", 10.0, "food")
        .with_subcategory("groceries")
        .with_note("old note");
    let id = service.record_entry(entry).await?.id;

    let outcome = service
        .update_entry(id, EntryPatch::default().with_note("new note"))
        .await?;
    assert_eq!(outcome.status, OpStatus::Ok);

    let entry = service.get_entry(id).await?.unwrap();
    assert_eq!(entry.note, "new note");
    assert_eq!(entry.date, "2024-01-05");
    assert_eq!(entry.amount, 10.0);
    assert_eq!(entry.category, "food");
    assert_eq!(entry.subcategory, "groceries");
    assert_eq!(entry.entry_type, EntryType::Debit);

    Ok(())
}

#[tokio::test]
async fn test_update_applies_multiple_fields() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let id = record(&service, "2024-01-05", 10.0, "food").await?;

    let patch = EntryPatch::default()
        .with_date("2024-01-06")
        .with_amount(12.5)
        .with_category("dining");
    let outcome = service.update_entry(id, patch).await?;
    assert_eq!(outcome.status, OpStatus::Ok);

    let entry = service.get_entry(id).await?.unwrap();
    assert_eq!(entry.date, "2024-01-06");
    assert_eq!(entry.amount, 12.5);
    assert_eq!(entry.category, "dining");

    Ok(())
}

#[tokio::test]
async fn test_empty_patch_returns_no_changes() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let id = record(&service, "2024-01-05", 10.0, "food").await?;

    let outcome = service.update_entry(id, EntryPatch::default()).await?;
    assert_eq!(outcome.status, OpStatus::NoChanges);
    assert_eq!(outcome.id, id);

    let entry = service.get_entry(id).await?.unwrap();
    assert_eq!(entry.amount, 10.0);
    assert_eq!(entry.category, "food");

    Ok(())
}

#[tokio::test]
async fn test_explicit_zero_amount_is_applied() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let id = record(&service, "2024-01-05", 10.0, "food").await?;

    // Zero is a supplied value, not an omission
    let outcome = service
        .update_entry(id, EntryPatch::default().with_amount(0.0))
        .await?;
    assert_eq!(outcome.status, OpStatus::Ok);

    let entry = service.get_entry(id).await?.unwrap();
    assert_eq!(entry.amount, 0.0);

    Ok(())
}

#[tokio::test]
async fn test_explicit_empty_strings_clear_optional_fields() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let entry = NewEntry::new("2024-01-05", 10.0, "food")
        .with_subcategory("groceries")
        .with_note("some note");
    let id = service.record_entry(entry).await?.id;

    let patch = EntryPatch::default().with_subcategory("").with_note("");
    let outcome = service.update_entry(id, patch).await?;
    assert_eq!(outcome.status, OpStatus::Ok);

    let entry = service.get_entry(id).await?.unwrap();
    assert_eq!(entry.subcategory, "");
    assert_eq!(entry.note, "");

    Ok(())
}

#[tokio::test]
async fn test_update_cannot_clear_category() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let id = record(&service, "2024-01-05", 10.0, "food").await?;

    let err = service
        .update_entry(id, EntryPatch::default().with_category(""))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MissingField("category")));

    let entry = service.get_entry(id).await?.unwrap();
    assert_eq!(entry.category, "food");

    Ok(())
}

#[tokio::test]
async fn test_update_rejects_invalid_date() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let id = record(&service, "2024-01-05", 10.0, "food").await?;

    let err = service
        .update_entry(id, EntryPatch::default().with_date("next tuesday"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidDate { .. }));

    Ok(())
}

#[tokio::test]
async fn test_update_nonexistent_id_reports_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let outcome = service
        .update_entry(9999, EntryPatch::default().with_note("x"))
        .await?;
    assert_eq!(outcome.status, OpStatus::NotFound);
    assert_eq!(outcome.id, 9999);

    Ok(())
}

#[tokio::test]
async fn test_update_never_alters_type() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let credit = NewEntry::new("2024-01-05", 100.0, "salary");
    let id = service.record_credit_entry(credit).await?.id;

    let patch = EntryPatch::default()
        .with_date("2024-01-06")
        .with_amount(200.0)
        .with_category("bonus")
        .with_subcategory("annual")
        .with_note("updated");
    service.update_entry(id, patch).await?;

    let entry = service.get_entry(id).await?.unwrap();
    assert_eq!(entry.entry_type, EntryType::Credit);

    Ok(())
}
