fn main() {
    println!("Run `cargo test -p wire-compat` to execute wire compatibility tests.");
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use assetmint_protocol::messages::{
        CompleteUploadRequest, CompleteUploadResponse, PrepareUploadRequest,
        PrepareUploadResponse, StartMintRequest, StartMintResponse,
    };
    use assetmint_protocol::types::{ContentCategory, Stage, UploadProgress};

    /// Returns the path to the fixtures directory.
    fn fixtures_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// Loads a fixture JSON file and returns it as a `serde_json::Value`.
    fn load_fixture(name: &str) -> serde_json::Value {
        let path = fixtures_dir().join(name);
        let data = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
        serde_json::from_str(&data)
            .unwrap_or_else(|e| panic!("failed to parse fixture {}: {e}", path.display()))
    }

    /// Deserializes a fixture into a Rust type, re-serializes it, and compares
    /// the JSON values (order-independent comparison).
    fn roundtrip_test<T>(name: &str) -> T
    where
        T: serde::de::DeserializeOwned + serde::Serialize,
    {
        let fixture = load_fixture(name);
        let parsed: T = serde_json::from_value(fixture.clone())
            .unwrap_or_else(|e| panic!("failed to deserialize {name}: {e}"));
        let reserialized = serde_json::to_value(&parsed)
            .unwrap_or_else(|e| panic!("failed to re-serialize {name}: {e}"));

        assert_eq!(
            fixture, reserialized,
            "roundtrip mismatch for {name}:\n  API:  {fixture}\n  Rust: {reserialized}"
        );
        parsed
    }

    // --- Prepare ---

    #[test]
    fn fixture_prepare_request() {
        let req: PrepareUploadRequest = roundtrip_test("prepare_request.json");
        assert_eq!(req.category, ContentCategory::Image);
        assert_eq!(req.private, Some(false));
    }

    #[test]
    fn prepare_metadata_string_decodes_to_asset_metadata() {
        let req: PrepareUploadRequest = roundtrip_test("prepare_request.json");
        let meta: assetmint_upload::AssetMetadata = serde_json::from_str(&req.metadata).unwrap();
        assert_eq!(meta.title, "Test Asset");
        assert_eq!(meta.description.as_deref(), Some("Evening sky"));
        assert!(meta.location.is_none());
        assert_eq!(serde_json::to_string(&meta).unwrap(), req.metadata);
    }

    #[test]
    fn fixture_prepare_response() {
        let resp: PrepareUploadResponse = roundtrip_test("prepare_response.json");
        assert_eq!(resp.chunk_count as usize, resp.parts.len());
        assert_eq!(resp.parts[0].part_number, 1);
    }

    // --- Complete ---

    #[test]
    fn fixture_complete_request() {
        let req: CompleteUploadRequest = roundtrip_test("complete_request.json");
        let numbers: Vec<u32> = req.chunks.iter().map(|c| c.part_number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }

    #[test]
    fn fixture_complete_response() {
        let resp: CompleteUploadResponse = roundtrip_test("complete_response.json");
        assert!(resp.is_success());
    }

    // --- Start mint ---

    #[test]
    fn fixture_start_mint_request() {
        let req: StartMintRequest = roundtrip_test("start_mint_request.json");
        assert_eq!(req.metadata.get("title"), Some("Test Asset"));
        assert_eq!(req.metadata.get("appName"), Some("assetmint"));
    }

    #[test]
    fn fixture_start_mint_response() {
        let resp: StartMintResponse = roundtrip_test("start_mint_response.json");
        assert_eq!(resp.status.as_deref(), Some("queued"));
        assert!(resp.token_id.is_none());
    }

    // --- Progress ---

    #[test]
    fn fixture_upload_progress() {
        let progress: UploadProgress = roundtrip_test("upload_progress.json");
        assert_eq!(progress.stage, Stage::Uploading);
        assert_eq!(progress.chunk_progress, Some(100));
    }

    #[test]
    fn reporter_output_matches_progress_fixture() {
        let counters = assetmint_upload::Counters {
            uploaded_chunks: 1,
            total_chunks: 2,
            current_chunk: 1,
            chunk_fraction: 0.0,
        };
        let built = assetmint_upload::to_progress(Stage::Uploading, &counters);
        assert_eq!(
            serde_json::to_value(&built).unwrap(),
            load_fixture("upload_progress.json")
        );
    }

    // --- Lenient decoding of sparse responses ---

    #[test]
    fn sparse_prepare_response_defaults() {
        let json = r#"{"chunkCount": 1, "chunkSize": 1024}"#;
        let resp: PrepareUploadResponse = serde_json::from_str(json).unwrap();
        assert!(resp.file_id.is_empty(), "missing fileId should default to empty");
        assert!(resp.upload_id.is_empty());
        assert!(resp.parts.is_empty());
    }

    #[test]
    fn complete_response_without_status_is_not_success() {
        let resp: CompleteUploadResponse = serde_json::from_str("{}").unwrap();
        assert!(!resp.is_success());
    }

    #[test]
    fn start_mint_response_without_status() {
        let resp: StartMintResponse = serde_json::from_str(r#"{"tokenId": "42"}"#).unwrap();
        assert!(resp.status.is_none(), "missing status should default to None");
        assert_eq!(resp.token_id.as_deref(), Some("42"));
    }
}
