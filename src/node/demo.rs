use log::{info, warn};

use super::Node;
use crate::blockchain::ChainError;
use crate::wallet::Wallet;

/// Generate some traffic for development: the node wallet and two local
/// wallets pay each other in turn, and a block is mined after every round.
pub fn seed_demo(node: &Node, rounds: usize) -> Result<(), ChainError> {
    let mut foo = Wallet::new();
    let mut bar = Wallet::new();
    let node_address = node.address();
    let foo_address = foo.public_key().to_string();
    let bar_address = bar.public_key().to_string();

    for i in 0..rounds {
        let results = match i % 3 {
            0 => [
                node.transact(&foo_address, 5),
                node.transact_from(&mut foo, &bar_address, 10),
            ],
            1 => [
                node.transact(&foo_address, 5),
                node.transact_from(&mut bar, &node_address, 15),
            ],
            _ => [
                node.transact_from(&mut foo, &bar_address, 10),
                node.transact_from(&mut bar, &node_address, 15),
            ],
        };
        for r in results {
            if let Err(e) = r {
                warn!("DEMO - round {i}: {e}");
            }
        }
        node.mine_transactions()?;
    }

    info!("DEMO - seeded {rounds} rounds, chain length {}", node.chain().len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::Blockchain;
    use crate::transaction::{MINING_REWARD, REWARD_ADDRESS};
    use crate::wallet::STARTING_BALANCE;
    use std::collections::{BTreeSet, HashSet};

    #[test]
    fn seeded_chain_is_valid_and_pool_drained() {
        let node = Node::default();
        seed_demo(&node, 4).expect("seeded");
        let chain = node.chain();
        assert_eq!(chain.len(), 5);
        assert!(Blockchain::is_valid_chain(&chain));
        assert!(Blockchain::new().valid_transaction_data(&chain[..2]));
        assert!(node.staged_transactions().is_empty());
    }

    #[test]
    fn seeded_rounds_carry_each_transaction_once_and_conserve_balances() {
        let rounds = 6;
        let node = Node::default();
        seed_demo(&node, rounds).expect("seeded");
        let chain = node.chain();
        assert_eq!(chain.len(), rounds + 1);

        let mut ids = HashSet::new();
        let mut addresses = BTreeSet::new();
        for block in &chain[1..] {
            let txs = block.transactions();
            // Two transfers and a reward every round.
            assert_eq!(txs.len(), 3);
            for tx in txs {
                assert!(ids.insert(tx.id.clone()), "{} mined twice", tx.id);
                addresses.extend(tx.output_map.keys().cloned());
            }
        }
        addresses.remove(REWARD_ADDRESS);
        assert_eq!(addresses.len(), 3);

        let total: u64 = addresses.iter().map(|a| node.balance_of(a)).sum();
        assert_eq!(
            total,
            3 * STARTING_BALANCE + rounds as u64 * MINING_REWARD
        );
        // Per 3 rounds the node sends 10, receives 30 and earns 3 rewards.
        assert_eq!(
            node.balance_of(&node.address()),
            STARTING_BALANCE + 2 * (30 - 10) + rounds as u64 * MINING_REWARD
        );
    }
}
