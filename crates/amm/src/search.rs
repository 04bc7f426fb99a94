//! Best-trade search over a graph of pools.
//!
//! The search is a depth-first walk driven by an explicit stack. Each frame
//! remembers which pool it will look at next, so descending into a branch and
//! resuming afterwards visits candidates in the same order a recursive walk
//! would. A pool is never used twice within one path and paths never exceed
//! `max_hops` pools, so the walk terminates on any graph, cycles and parallel
//! pools included.

use crate::amount::Amount;
use crate::asset::Token;
use crate::error::{AmmError, Result};
use crate::pool::Pool;
use crate::route::Route;
use crate::trade::Trade;
use std::cmp::Ordering;
use tracing::{debug, trace};

/// Bounds of a best-trade search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestTradeOptions {
    /// Maximum number of pools in a returned route.
    pub max_hops: usize,
    /// Maximum number of trades returned.
    pub max_num_results: usize,
}

impl Default for BestTradeOptions {
    fn default() -> Self {
        Self {
            max_hops: 3,
            max_num_results: 3,
        }
    }
}

impl BestTradeOptions {
    fn validate(&self) -> Result<()> {
        if self.max_hops == 0 {
            return Err(AmmError::InvalidSearch("max_hops must be at least 1"));
        }
        if self.max_num_results == 0 {
            return Err(AmmError::InvalidSearch("max_num_results must be at least 1"));
        }
        Ok(())
    }
}

/// Ranks trades best first: more output, then less input, then fewer hops.
pub fn compare_trades(a: &Trade, b: &Trade) -> Ordering {
    b.output_amount()
        .raw()
        .cmp(a.output_amount().raw())
        .then_with(|| a.input_amount().raw().cmp(b.input_amount().raw()))
        .then_with(|| a.hops().cmp(&b.hops()))
}

/// Insert `trade` after every entry that ranks at least as well, keeping at
/// most `max` entries.
fn sorted_insert(trades: &mut Vec<Trade>, trade: Trade, max: usize) {
    let position = trades
        .iter()
        .position(|existing| compare_trades(existing, &trade) == Ordering::Greater)
        .unwrap_or(trades.len());
    if position >= max {
        return;
    }
    trades.insert(position, trade);
    trades.truncate(max);
}

/// One partially explored path.
struct Frame {
    /// Asset currently held (exact-in) or still owed (exact-out).
    token: Token,
    amount: Amount,
    /// Indices into the candidate pools, in walk order.
    path: Vec<usize>,
    /// Next candidate pool to consider.
    next: usize,
}

/// The best trades selling exactly `amount_in` for `token_out`, best first.
///
/// Pools whose leg fails (empty reserves, an amount too small to produce
/// output, ...) are pruned from that branch; they never abort the search.
pub fn best_trade_exact_in(
    pools: &[Pool],
    amount_in: &Amount,
    token_out: &Token,
    options: BestTradeOptions,
) -> Result<Vec<Trade>> {
    options.validate()?;
    let token_in = amount_in.asset().require_token()?;
    if token_in == token_out {
        return Err(AmmError::IdenticalAssets(token_in.address));
    }

    let mut best = Vec::with_capacity(options.max_num_results);
    let mut stack = vec![Frame {
        token: token_in.clone(),
        amount: amount_in.clone(),
        path: Vec::new(),
        next: 0,
    }];

    'frames: while let Some(mut frame) = stack.pop() {
        while frame.next < pools.len() {
            let index = frame.next;
            frame.next += 1;
            let pool = &pools[index];
            if frame.path.contains(&index) || !pool.involves(&frame.token) {
                continue;
            }

            let amount_out = match pool.get_output_amount(&frame.amount) {
                Ok((amount_out, _)) => amount_out,
                Err(err) => {
                    trace!(pool = %pool.id(), %err, "pruning exact-in branch");
                    continue;
                }
            };
            let Ok(next_token) = pool.other(&frame.token).cloned() else {
                continue;
            };
            let mut path = frame.path.clone();
            path.push(index);

            if next_token == *token_out {
                let route = Route::new(collect(pools, path.iter().copied()), token_in)?;
                let trade = Trade::exact_in(route, amount_in.clone())?;
                debug!(hops = trade.hops(), output = %trade.output_amount(), "exact-in candidate");
                sorted_insert(&mut best, trade, options.max_num_results);
            } else if path.len() < options.max_hops {
                stack.push(frame);
                stack.push(Frame {
                    token: next_token,
                    amount: amount_out,
                    path,
                    next: 0,
                });
                continue 'frames;
            }
        }
    }

    Ok(best)
}

/// The best trades buying exactly `amount_out` with `token_in`, best first.
///
/// Paths are grown backwards from the output asset.
pub fn best_trade_exact_out(
    pools: &[Pool],
    token_in: &Token,
    amount_out: &Amount,
    options: BestTradeOptions,
) -> Result<Vec<Trade>> {
    options.validate()?;
    let token_out = amount_out.asset().require_token()?;
    if token_in == token_out {
        return Err(AmmError::IdenticalAssets(token_in.address));
    }

    let mut best = Vec::with_capacity(options.max_num_results);
    let mut stack = vec![Frame {
        token: token_out.clone(),
        amount: amount_out.clone(),
        path: Vec::new(),
        next: 0,
    }];

    'frames: while let Some(mut frame) = stack.pop() {
        while frame.next < pools.len() {
            let index = frame.next;
            frame.next += 1;
            let pool = &pools[index];
            if frame.path.contains(&index) || !pool.involves(&frame.token) {
                continue;
            }

            let amount_in = match pool.get_input_amount(&frame.amount) {
                Ok((amount_in, _)) => amount_in,
                Err(err) => {
                    trace!(pool = %pool.id(), %err, "pruning exact-out branch");
                    continue;
                }
            };
            let Ok(next_token) = pool.other(&frame.token).cloned() else {
                continue;
            };
            let mut path = frame.path.clone();
            path.push(index);

            if next_token == *token_in {
                // the path was built from the output end
                let route = Route::new(collect(pools, path.iter().rev().copied()), token_in)?;
                let trade = Trade::exact_out(route, amount_out.clone())?;
                debug!(hops = trade.hops(), input = %trade.input_amount(), "exact-out candidate");
                sorted_insert(&mut best, trade, options.max_num_results);
            } else if path.len() < options.max_hops {
                stack.push(frame);
                stack.push(Frame {
                    token: next_token,
                    amount: amount_in,
                    path,
                    next: 0,
                });
                continue 'frames;
            }
        }
    }

    Ok(best)
}

fn collect(pools: &[Pool], indices: impl Iterator<Item = usize>) -> Vec<Pool> {
    indices.map(|index| pools[index].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::PoolParams;
    use alloy_primitives::Address;
    use num_bigint::BigInt;

    fn token(byte: u8, symbol: &str) -> Token {
        Token::new(1, Address::repeat_byte(byte), 18).with_symbol(symbol)
    }

    fn amount(token: &Token, raw: u64) -> Amount {
        Amount::from_raw(token.clone(), raw).unwrap()
    }

    fn pool(a: &Token, ra: u64, b: &Token, rb: u64) -> Pool {
        Pool::with_params(amount(a, ra), amount(b, rb), PoolParams::default().with_fee_bps(0)).unwrap()
    }

    fn tokens() -> (Token, Token, Token, Token) {
        (token(1, "A"), token(2, "B"), token(3, "C"), token(4, "D"))
    }

    #[test]
    fn test_direct_and_indirect_ranked() {
        let (a, b, c, _) = tokens();
        let pools = vec![
            pool(&a, 1000, &c, 1000),
            pool(&a, 1000, &b, 2000),
            pool(&b, 2000, &c, 4000),
        ];
        let trades =
            best_trade_exact_in(&pools, &amount(&a, 100), &c, BestTradeOptions::default()).unwrap();
        assert_eq!(trades.len(), 2);
        // A -> B -> C: 100 -> 181 -> 331 beats A -> C: 90
        assert_eq!(trades[0].hops(), 2);
        assert_eq!(trades[0].output_amount().raw(), &BigInt::from(331));
        assert_eq!(trades[1].hops(), 1);
        assert_eq!(trades[1].output_amount().raw(), &BigInt::from(90));
    }

    #[test]
    fn test_respects_max_hops() {
        let (a, b, c, _) = tokens();
        let pools = vec![
            pool(&a, 1000, &c, 1000),
            pool(&a, 1000, &b, 2000),
            pool(&b, 2000, &c, 4000),
        ];
        let options = BestTradeOptions {
            max_hops: 1,
            max_num_results: 3,
        };
        let trades = best_trade_exact_in(&pools, &amount(&a, 100), &c, options).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].hops(), 1);
    }

    #[test]
    fn test_respects_max_num_results() {
        let (a, b, c, _) = tokens();
        let pools = vec![
            pool(&a, 1000, &c, 1000),
            pool(&a, 2000, &c, 2000),
            pool(&a, 3000, &c, 3000),
            pool(&a, 1000, &b, 1000),
            pool(&b, 1000, &c, 1000),
        ];
        let options = BestTradeOptions {
            max_hops: 3,
            max_num_results: 2,
        };
        let trades = best_trade_exact_in(&pools, &amount(&a, 100), &c, options).unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].route().pools()[0], pools[2]);
        assert_eq!(trades[1].route().pools()[0], pools[1]);
    }

    #[test]
    fn test_ties_prefer_fewer_hops() {
        let (a, b, c, _) = tokens();
        // A -> B -> C (10 -> 99 -> 9) and A -> C (10 -> 9) tie; the direct one
        // ranks first even though it is found last
        let pools = vec![
            pool(&a, 1000, &b, 10_000),
            pool(&b, 10_000, &c, 1000),
            pool(&a, 100, &c, 100),
        ];
        let trades =
            best_trade_exact_in(&pools, &amount(&a, 10), &c, BestTradeOptions::default()).unwrap();
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].output_amount(), trades[1].output_amount());
        assert_eq!(trades[0].hops(), 1);
        assert_eq!(trades[1].hops(), 2);
    }

    #[test]
    fn test_cycles_terminate_without_pool_reuse() {
        let (a, b, c, d) = tokens();
        let pools = vec![
            pool(&a, 1000, &b, 1000),
            pool(&b, 1000, &a, 1100),
            pool(&b, 1000, &c, 1000),
            pool(&c, 1000, &a, 1000),
            pool(&c, 1000, &d, 1000),
            pool(&b, 1000, &d, 1000),
        ];
        let options = BestTradeOptions {
            max_hops: 4,
            max_num_results: 10,
        };
        let trades = best_trade_exact_in(&pools, &amount(&a, 10), &d, options).unwrap();
        assert!(!trades.is_empty());
        for trade in &trades {
            assert!(trade.hops() <= 4);
            let used = trade.route().pools();
            for (i, pool) in used.iter().enumerate() {
                assert!(!used[i + 1..].contains(pool));
            }
        }
        for pair in trades.windows(2) {
            assert_ne!(compare_trades(&pair[0], &pair[1]), Ordering::Greater);
        }
    }

    #[test]
    fn test_failing_pools_are_pruned() {
        let (a, b, c, _) = tokens();
        let empty = pool(&a, 1000, &b, 1000).with_reserves(0, 0).unwrap();
        let pools = vec![empty, pool(&a, 1000, &c, 1000), pool(&b, 1000, &c, 1000)];
        let trades =
            best_trade_exact_in(&pools, &amount(&a, 100), &c, BestTradeOptions::default()).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].route().pools()[0], pools[1]);
    }

    #[test]
    fn test_no_route_is_empty() {
        let (a, b, c, d) = tokens();
        let pools = vec![pool(&a, 1000, &b, 1000), pool(&c, 1000, &d, 1000)];
        let trades =
            best_trade_exact_in(&pools, &amount(&a, 100), &d, BestTradeOptions::default()).unwrap();
        assert!(trades.is_empty());
    }

    #[test]
    fn test_exact_out_ranks_by_input() {
        let (a, b, c, _) = tokens();
        let pools = vec![
            pool(&a, 1000, &c, 1000),
            pool(&a, 1000, &b, 2000),
            pool(&b, 2000, &c, 4000),
        ];
        let trades =
            best_trade_exact_out(&pools, &a, &amount(&c, 50), BestTradeOptions::default()).unwrap();
        assert_eq!(trades.len(), 2);
        assert!(trades[0].input_amount().raw() <= trades[1].input_amount().raw());
        assert_eq!(trades[0].hops(), 2);
        for trade in &trades {
            assert_eq!(trade.output_amount(), &amount(&c, 50));
            assert_eq!(trade.route().input(), &a);
            assert_eq!(trade.route().output(), &c);
        }
        // direct leg: 1000 * 50 / 950 + 1 = 53
        assert_eq!(trades[1].input_amount().raw(), &BigInt::from(53));
    }

    #[test]
    fn test_exact_out_skips_drained_pools() {
        let (a, _, c, _) = tokens();
        let pools = vec![pool(&a, 1000, &c, 40), pool(&a, 1000, &c, 1000)];
        let trades =
            best_trade_exact_out(&pools, &a, &amount(&c, 50), BestTradeOptions::default()).unwrap();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].route().pools()[0], pools[1]);
    }

    #[test]
    fn test_invalid_options() {
        let (a, _, c, _) = tokens();
        let pools = vec![pool(&a, 1000, &c, 1000)];
        let zero_hops = BestTradeOptions {
            max_hops: 0,
            max_num_results: 3,
        };
        assert!(matches!(
            best_trade_exact_in(&pools, &amount(&a, 1), &c, zero_hops),
            Err(AmmError::InvalidSearch(_))
        ));
        assert_eq!(
            best_trade_exact_in(&pools, &amount(&a, 1), &a, BestTradeOptions::default()),
            Err(AmmError::IdenticalAssets(a.address))
        );
    }
}
