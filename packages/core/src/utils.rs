// ABOUTME: Shared utility functions for Tagger
// ABOUTME: Document ID generation

/// Generate a unique document ID (12 alphanumeric characters)
pub fn generate_document_id() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..12)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}
