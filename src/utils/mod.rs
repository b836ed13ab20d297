//! Slippage arithmetic and token metadata upload.

use isahc::{AsyncReadResponseExt, Request, RequestExt};
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::ClientError;

/// Metadata submitted when creating a new token.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTokenMetadata {
    pub name: String,
    pub symbol: String,
    pub description: String,
    /// Raw image bytes, uploaded alongside the JSON metadata
    pub file: Vec<u8>,
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub website: Option<String>,
}

/// Response from the metadata upload service.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenMetadataResponse {
    #[serde(rename = "metadataUri")]
    pub metadata_uri: String,
    pub metadata: TokenMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// Amount to request with buy slippage applied: the maximum SOL the caller
/// will pay. Uses the same floored basis-point arithmetic as the on-chain
/// program so the bound never disagrees with it by a rounding step.
///
/// Intermediate math is widened to u128 so large amounts and large
/// basis-point values cannot overflow; the result saturates at `u64::MAX`.
pub fn calculate_with_slippage_buy(amount: u64, basis_points: u64) -> u64 {
    let adjustment = amount as u128 * basis_points as u128 / 10_000;
    (amount as u128 + adjustment).min(u64::MAX as u128) as u64
}

/// Amount to accept with sell slippage applied: the minimum SOL output the
/// caller will tolerate. Never exceeds `amount`; basis points at or above
/// 10_000 clamp the bound to zero instead of underflowing.
pub fn calculate_with_slippage_sell(amount: u64, basis_points: u64) -> u64 {
    let adjustment = (amount as u128 * basis_points as u128 / 10_000).min(amount as u128);
    amount - adjustment as u64
}

fn multipart_field(boundary: &str, name: &str, value: &str) -> Vec<u8> {
    format!(
        "--{}\r\ncontent-disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
        boundary, name, value
    )
    .into_bytes()
}

/// Uploads token metadata (JSON fields plus the image file) to the IPFS
/// pinning service and returns the hosted metadata URI for the create
/// instruction.
///
/// # Errors
///
/// Returns `ClientError::UploadMetadataError` if the upload request fails or
/// the service responds with anything but a parseable success body.
pub async fn create_token_metadata(
    metadata: CreateTokenMetadata,
) -> Result<TokenMetadataResponse, ClientError> {
    let boundary = format!("----{}", u64::from_le_bytes(rand_seed()));

    let mut body = Vec::new();
    body.extend_from_slice(&multipart_field(&boundary, "name", &metadata.name));
    body.extend_from_slice(&multipart_field(&boundary, "symbol", &metadata.symbol));
    body.extend_from_slice(&multipart_field(
        &boundary,
        "description",
        &metadata.description,
    ));
    if let Some(twitter) = &metadata.twitter {
        body.extend_from_slice(&multipart_field(&boundary, "twitter", twitter));
    }
    if let Some(telegram) = &metadata.telegram {
        body.extend_from_slice(&multipart_field(&boundary, "telegram", telegram));
    }
    if let Some(website) = &metadata.website {
        body.extend_from_slice(&multipart_field(&boundary, "website", website));
    }
    body.extend_from_slice(&multipart_field(&boundary, "showName", "true"));
    body.extend_from_slice(
        format!(
            "--{}\r\ncontent-disposition: form-data; name=\"file\"; filename=\"image\"\r\ncontent-type: application/octet-stream\r\n\r\n",
            boundary
        )
        .as_bytes(),
    );
    body.extend_from_slice(&metadata.file);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    let request = Request::post(constants::METADATA_UPLOAD_URL)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(body)
        .map_err(|e| ClientError::UploadMetadataError(Box::new(e)))?;

    let mut response = request
        .send_async()
        .await
        .map_err(|e| ClientError::UploadMetadataError(Box::new(e)))?;

    let text = response
        .text()
        .await
        .map_err(|e| ClientError::UploadMetadataError(Box::new(e)))?;

    if !response.status().is_success() {
        return Err(ClientError::UploadMetadataError(
            format!("upload failed with HTTP {}: {}", response.status(), text).into(),
        ));
    }

    serde_json::from_str(&text).map_err(|e| ClientError::UploadMetadataError(Box::new(e)))
}

// Boundary uniqueness only; not security-sensitive.
fn rand_seed() -> [u8; 8] {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64 ^ d.as_secs())
        .unwrap_or(0);
    nanos.to_le_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_slippage_raises_the_bound() {
        // 5% on 1 SOL
        assert_eq!(
            calculate_with_slippage_buy(1_000_000_000, 500),
            1_050_000_000
        );
        // Floors the adjustment rather than rounding up
        assert_eq!(calculate_with_slippage_buy(999, 500), 999 + 49);
        // Zero slippage is the identity
        assert_eq!(calculate_with_slippage_buy(12_345, 0), 12_345);
    }

    #[test]
    fn sell_slippage_lowers_the_bound() {
        assert_eq!(calculate_with_slippage_sell(1_000_000_000, 500), 950_000_000);
        assert_eq!(calculate_with_slippage_sell(999, 500), 999 - 49);
        assert_eq!(calculate_with_slippage_sell(12_345, 0), 12_345);
    }

    #[test]
    fn slippage_bounds_bracket_the_quote() {
        for bps in [0u64, 1, 50, 100, 500, 1_000, 9_999, 10_000, 10_001, u64::MAX] {
            let quote = 777_777_777u64;
            assert!(calculate_with_slippage_buy(quote, bps) >= quote);
            assert!(calculate_with_slippage_sell(quote, bps) <= quote);
        }
    }

    #[test]
    fn sell_slippage_clamps_at_full_tolerance() {
        // 100% tolerance accepts any output; beyond 100% cannot go below zero
        assert_eq!(calculate_with_slippage_sell(1_000_000_000, 10_000), 0);
        assert_eq!(calculate_with_slippage_sell(1_000_000_000, 10_001), 0);
        assert_eq!(calculate_with_slippage_sell(1_000_000_000, 9_999), 100_000);
        assert_eq!(calculate_with_slippage_sell(u64::MAX, 1), u64::MAX - u64::MAX / 10_000);
    }

    #[test]
    fn buy_slippage_saturates_instead_of_overflowing() {
        assert_eq!(calculate_with_slippage_buy(u64::MAX, 1), u64::MAX);
        assert_eq!(calculate_with_slippage_buy(u64::MAX, 10_000), u64::MAX);
        // Large-but-safe inputs still compute exactly
        let half = u64::MAX / 2;
        assert_eq!(calculate_with_slippage_buy(half, 10_000), half + half);
    }

    #[test]
    fn multipart_fields_are_well_formed() {
        let field = multipart_field("----b", "name", "Token");
        let text = String::from_utf8(field).unwrap();
        assert!(text.starts_with("------b\r\n"));
        assert!(text.contains("name=\"name\""));
        assert!(text.ends_with("Token\r\n"));
    }
}
