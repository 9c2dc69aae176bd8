//! Greedy settlement of net balances into point-to-point transfers.
//!
//! The solver repeatedly pairs the largest remaining creditor with the largest
//! remaining debtor. Every step fully resolves at least one party, so it emits
//! at most `creditors + debtors - 1` transfers. This is not the minimum number
//! of transfers in general (that problem is NP-hard); callers should not rely
//! on minimality.

use serde::{Deserialize, Serialize};

use crate::{
    MoneyCents,
    balances::{NetBalance, NetBalances},
    groups::MemberId,
};

/// A single payment from a debtor to a creditor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: MoneyCents,
}

/// Produces transfers that bring every balance to zero.
///
/// Creditors are ordered by descending balance and debtors by descending
/// magnitude; equal amounts keep the original member order. Returns an empty
/// list when there are no creditors or no debtors.
pub fn compute_settlements(balances: &NetBalances) -> Vec<Transfer> {
    let mut creditors: Vec<NetBalance> = balances
        .iter()
        .filter(|b| b.amount.is_positive())
        .copied()
        .collect();
    let mut debtors: Vec<NetBalance> = balances
        .iter()
        .filter(|b| b.amount.is_negative())
        .map(|b| NetBalance {
            member_id: b.member_id,
            amount: b.amount.abs(),
        })
        .collect();

    // Stable sorts: ties stay in member order.
    creditors.sort_by(|a, b| b.amount.cmp(&a.amount));
    debtors.sort_by(|a, b| b.amount.cmp(&a.amount));

    let mut transfers = Vec::new();
    let (mut ci, mut di) = (0, 0);
    while ci < creditors.len() && di < debtors.len() {
        let creditor = &mut creditors[ci];
        let debtor = &mut debtors[di];
        let amount = creditor.amount.min(debtor.amount);

        transfers.push(Transfer {
            from: debtor.member_id,
            to: creditor.member_id,
            amount,
        });
        creditor.amount -= amount;
        debtor.amount -= amount;

        if creditor.amount.is_zero() {
            ci += 1;
        }
        if debtor.amount.is_zero() {
            di += 1;
        }
    }

    tracing::debug!(
        creditors = creditors.len(),
        debtors = debtors.len(),
        transfers = transfers.len(),
        "computed settlements"
    );
    transfers
}

/// Applies transfers to balances: debits `from`, credits `to`.
///
/// Paying a debt raises the debtor's (negative) balance and lowers the
/// creditor's. Transfers naming members absent from `balances` are ignored.
pub fn apply_transfers(balances: &NetBalances, transfers: &[Transfer]) -> NetBalances {
    let mut result = balances.clone();
    for transfer in transfers {
        if let Some(from) = result.entry_mut(transfer.from) {
            *from += transfer.amount;
        }
        if let Some(to) = result.entry_mut(transfer.to) {
            *to -= transfer.amount;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn balances(amounts: &[i64]) -> (Vec<MemberId>, NetBalances) {
        let ids: Vec<MemberId> = amounts.iter().map(|_| Uuid::new_v4()).collect();
        let balances = NetBalances::from_pairs(
            ids.iter()
                .copied()
                .zip(amounts.iter().map(|&a| MoneyCents::new(a))),
        );
        (ids, balances)
    }

    #[test]
    fn single_creditor_receives_from_each_debtor() {
        let (ids, b) = balances(&[80_000, -40_000, -40_000]);
        let transfers = compute_settlements(&b);

        assert_eq!(
            transfers,
            vec![
                Transfer {
                    from: ids[1],
                    to: ids[0],
                    amount: MoneyCents::new(40_000),
                },
                Transfer {
                    from: ids[2],
                    to: ids[0],
                    amount: MoneyCents::new(40_000),
                },
            ]
        );
        assert!(apply_transfers(&b, &transfers).is_settled());
    }

    #[test]
    fn settled_group_needs_no_transfers() {
        let (_, b) = balances(&[0, 0]);
        assert!(compute_settlements(&b).is_empty());
        assert!(compute_settlements(&NetBalances::default()).is_empty());
    }

    #[test]
    fn largest_parties_are_matched_first() {
        let (ids, b) = balances(&[100, 500, -300, -300]);
        let transfers = compute_settlements(&b);

        assert_eq!(transfers[0].to, ids[1]);
        assert_eq!(transfers[0].from, ids[2]);
        assert_eq!(transfers[0].amount, MoneyCents::new(300));
        assert!(apply_transfers(&b, &transfers).is_settled());
    }

    #[test]
    fn simultaneous_zero_advances_both_sides() {
        let (ids, b) = balances(&[300, 200, -300, -200]);
        let transfers = compute_settlements(&b);

        assert_eq!(transfers.len(), 2);
        assert_eq!((transfers[0].from, transfers[0].to), (ids[2], ids[0]));
        assert_eq!((transfers[1].from, transfers[1].to), (ids[3], ids[1]));
    }

    #[test]
    fn ties_follow_member_order() {
        let (ids, b) = balances(&[-100, 200, -100]);
        let transfers = compute_settlements(&b);
        assert_eq!(transfers[0].from, ids[0]);
        assert_eq!(transfers[1].from, ids[2]);
    }

    #[test]
    fn transfer_count_is_bounded() {
        let cases: [&[i64]; 4] = [
            &[700, -100, -200, -400],
            &[123, 456, -789, 210, -0, -0],
            &[1, 1, 1, -1, -1, -1],
            &[5000, -1234, -1766, 3000, -5000],
        ];
        for amounts in cases {
            let (_, b) = balances(amounts);
            let creditors = b.iter().filter(|x| x.amount.is_positive()).count();
            let debtors = b.iter().filter(|x| x.amount.is_negative()).count();
            let transfers = compute_settlements(&b);

            assert!(transfers.len() <= creditors + debtors - 1);
            assert!(transfers.iter().all(|t| t.amount.is_positive()));
            assert!(apply_transfers(&b, &transfers).is_settled());
        }
    }
}
