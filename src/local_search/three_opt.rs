use super::is_improvement;
use crate::distance::DistanceMatrix;

/// Finds the first cut `(i, j, k)` where recombining the middle segments
/// `B = seq[i..j]` and `C = seq[j..k]` shortens the tour, applies the best
/// recombination for that cut and stops. One move only, to bound the cost.
pub fn three_opt_once(seq: &mut [usize], dm: &DistanceMatrix) -> bool {
    let n = seq.len();
    if n < 5 {
        return false;
    }

    let current = dm.path_distance(seq);
    let mut candidate = Vec::with_capacity(n);
    let mut best: Option<(f64, Vec<usize>)> = None;

    for i in 1..n - 3 {
        for j in (i + 1)..n - 2 {
            for k in (j + 1)..n - 1 {
                let (head, b, c, tail) = (&seq[..i], &seq[i..j], &seq[j..k], &seq[k..]);

                for variant in Variant::ALL {
                    candidate.clear();
                    candidate.extend_from_slice(head);
                    variant.push_middle(&mut candidate, b, c);
                    candidate.extend_from_slice(tail);

                    let d = dm.path_distance(&candidate);
                    let bar = best.as_ref().map_or(current, |(bd, _)| *bd);
                    if is_improvement(d, bar) {
                        best = Some((d, candidate.clone()));
                    }
                }

                if let Some((_, better)) = best.take() {
                    seq.copy_from_slice(&better);
                    return true;
                }
            }
        }
    }
    false
}

#[derive(Debug, Clone, Copy)]
enum Variant {
    ReverseB,
    ReverseC,
    ReverseBoth,
    Swap,
    SwapReverseB,
    SwapReverseC,
    SwapReverseBoth,
}

impl Variant {
    const ALL: [Variant; 7] = [
        Variant::ReverseB,
        Variant::ReverseC,
        Variant::ReverseBoth,
        Variant::Swap,
        Variant::SwapReverseB,
        Variant::SwapReverseC,
        Variant::SwapReverseBoth,
    ];

    fn push_middle(self, out: &mut Vec<usize>, b: &[usize], c: &[usize]) {
        match self {
            Variant::ReverseB => {
                out.extend(b.iter().rev());
                out.extend_from_slice(c);
            }
            Variant::ReverseC => {
                out.extend_from_slice(b);
                out.extend(c.iter().rev());
            }
            Variant::ReverseBoth => {
                out.extend(b.iter().rev());
                out.extend(c.iter().rev());
            }
            Variant::Swap => {
                out.extend_from_slice(c);
                out.extend_from_slice(b);
            }
            Variant::SwapReverseB => {
                out.extend_from_slice(c);
                out.extend(b.iter().rev());
            }
            Variant::SwapReverseC => {
                out.extend(c.iter().rev());
                out.extend_from_slice(b);
            }
            Variant::SwapReverseBoth => {
                out.extend(c.iter().rev());
                out.extend(b.iter().rev());
            }
        }
    }
}
