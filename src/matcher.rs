use crate::features::Descriptor;
use std::convert::Infallible;

/// A candidate match for a source descriptor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    /// Index of the matched descriptor in the target set.
    pub index: usize,

    /// Distance between the source and target descriptors.
    pub distance: f32,
}

/// Finds the nearest target descriptors for every source descriptor.
pub trait DescriptorMatcher {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns one list per descriptor in `source` holding at most `k`
    /// neighbours from `target`, sorted by ascending distance.
    ///
    /// `search_budget` bounds the candidates an approximate matcher visits.
    fn match_knn(
        &self,
        source: &[Descriptor],
        target: &[Descriptor],
        k: usize,
        search_budget: u32,
    ) -> Result<Vec<Vec<Neighbor>>, Self::Error>;
}

/// Exhaustive matcher over Hamming distance.
///
/// Every target is visited so the search budget has no effect. Equal
/// distances are ordered by target index.
#[derive(Clone, Copy, Debug, Default)]
pub struct BruteForceHamming;

impl DescriptorMatcher for BruteForceHamming {
    type Error = Infallible;

    fn match_knn(
        &self,
        source: &[Descriptor],
        target: &[Descriptor],
        k: usize,
        _search_budget: u32,
    ) -> Result<Vec<Vec<Neighbor>>, Self::Error> {
        Ok(source
            .iter()
            .map(|query| {
                let mut neighbors: Vec<Neighbor> = target
                    .iter()
                    .enumerate()
                    .map(|(index, train)| Neighbor {
                        index,
                        distance: hamming_distance(query, train) as f32,
                    })
                    .collect();

                // Stable, so ties stay in target order.
                neighbors.sort_by(|a, b| a.distance.total_cmp(&b.distance));
                neighbors.truncate(k);
                neighbors
            })
            .collect())
    }
}

/// Counts the differing bits of two packed descriptors.
#[inline]
pub fn hamming_distance(a: &Descriptor, b: &Descriptor) -> u32 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| (x ^ y).count_ones())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn descriptor(bytes: &[(usize, u8)]) -> Descriptor {
        let mut descriptor = [0u8; 32];
        for &(i, byte) in bytes {
            descriptor[i] = byte;
        }
        descriptor
    }

    #[rstest]
    #[case([0; 32], [0; 32], 0)]
    #[case([0; 32], [0xff; 32], 256)]
    #[case(descriptor(&[(0, 0b1011)]), descriptor(&[(0, 0b0001)]), 2)]
    fn distance(#[case] a: Descriptor, #[case] b: Descriptor, #[case] expected: u32) {
        assert_eq!(hamming_distance(&a, &b), expected);
    }

    #[test]
    fn nearest_first() {
        let source = [descriptor(&[(0, 0b0111)])];
        let target = [
            descriptor(&[(0, 0b1000)]),
            descriptor(&[(0, 0b0011)]),
            descriptor(&[(0, 0b0111)]),
        ];

        let matches = BruteForceHamming
            .match_knn(&source, &target, 2, 1)
            .unwrap();
        assert_eq!(
            matches,
            vec![vec![
                Neighbor {
                    index: 2,
                    distance: 0.
                },
                Neighbor {
                    index: 1,
                    distance: 1.
                },
            ]]
        );
    }

    #[test]
    fn ties_keep_target_order() {
        let source = [descriptor(&[])];
        let target = [descriptor(&[(1, 1)]), descriptor(&[(0, 1)])];

        let matches = BruteForceHamming
            .match_knn(&source, &target, 2, 1)
            .unwrap();
        let indices: Vec<usize> = matches[0].iter().map(|n| n.index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn fewer_targets_than_k() {
        let matches = BruteForceHamming
            .match_knn(&[[0; 32], [1; 32]], &[[0; 32]], 2, 1)
            .unwrap();
        assert_eq!(matches.len(), 2);
        assert!(matches.iter().all(|neighbors| neighbors.len() == 1));
    }
}
