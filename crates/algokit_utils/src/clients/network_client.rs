/// Genesis ids used by LocalNet, sandbox and docker development networks.
const LOCALNET_GENESIS_IDS: [&str; 3] = ["devnet-v1", "sandnet-v1", "dockernet-v1"];

pub fn genesis_id_is_localnet(genesis_id: &str) -> bool {
    LOCALNET_GENESIS_IDS.contains(&genesis_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_localnet_genesis_ids() {
        assert!(genesis_id_is_localnet("dockernet-v1"));
        assert!(genesis_id_is_localnet("devnet-v1"));
        assert!(!genesis_id_is_localnet("testnet-v1.0"));
        assert!(!genesis_id_is_localnet(""));
    }
}
