//! CryptoNote tree hash over transaction hashes.
//!
//! Unlike a Bitcoin-style merkle tree, leaves are never duplicated. For a
//! non-power-of-two count the leading leaves are carried up one level
//! unchanged and only the trailing ones are paired, so the first full level
//! holds exactly the largest power of two below the leaf count.

use crate::hash::{hash_concat, Hash};

/// Compute the tree hash (merkle root) of an ordered list of hashes.
///
/// Returns the zero hash if the list is empty.
pub fn tree_hash(hashes: &[Hash]) -> Hash {
    match hashes {
        [] => Hash::ZERO,
        [only] => *only,
        [left, right] => hash_pair(left, right),
        _ => {
            let count = hashes.len();
            let mut cnt = tree_width(count);

            let carried = 2 * cnt - count;
            let mut level = Vec::with_capacity(cnt);
            level.extend_from_slice(&hashes[..carried]);
            for pair in hashes[carried..].chunks_exact(2) {
                level.push(hash_pair(&pair[0], &pair[1]));
            }
            debug_assert_eq!(level.len(), cnt);

            while cnt > 2 {
                cnt >>= 1;
                for j in 0..cnt {
                    level[j] = hash_pair(&level[2 * j], &level[2 * j + 1]);
                }
            }

            hash_pair(&level[0], &level[1])
        }
    }
}

/// Width of the first full level: the largest power of two strictly below
/// `count` (`count >= 3`).
fn tree_width(count: usize) -> usize {
    let mut cnt = (count - 1) as u64;
    for shift in [1, 2, 4, 8, 16, 32] {
        cnt |= cnt >> shift;
    }
    cnt &= !(cnt >> 1);
    cnt as usize
}

fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    hash_concat(&[left.as_ref(), right.as_ref()])
}
