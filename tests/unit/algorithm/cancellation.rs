#[cfg(test)]
mod tests {
    use wavetile::CancellationToken;

    // Tests clones share one flag
    // Verified by giving each clone its own flag
    #[test]
    fn test_clones_observe_cancel() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());

        token.cancel();
        assert!(clone.is_cancelled());
        assert!(token.is_cancelled());
    }

    // Tests cancellation is visible across threads
    // Verified by storing the flag in a thread-local
    #[test]
    fn test_cancel_from_other_thread() {
        let token = CancellationToken::new();
        let remote = token.clone();
        let handle = std::thread::spawn(move || remote.cancel());
        assert!(handle.join().is_ok());
        assert!(token.is_cancelled());
    }
}
