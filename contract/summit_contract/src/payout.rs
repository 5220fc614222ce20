use soroban_sdk::{token, Address, Env, Vec};

use crate::storage_types::SummitError;

/// Split `pool` equally across `participants`.
///
/// Returns `(share, remainder)` where `share * participants + remainder == pool`
/// and `remainder < participants`.
pub fn equal_split(pool: i128, participants: u32) -> Result<(i128, i128), SummitError> {
    if participants == 0 {
        return Err(SummitError::NoVerifiedParticipants);
    }
    if pool < 0 {
        return Err(SummitError::InvalidAmount);
    }

    let count = participants as i128;
    let share = pool / count;
    let paid = share.checked_mul(count).ok_or(SummitError::ArithmeticError)?;

    Ok((share, pool - paid))
}

/// Pay `share` of `asset` from the contract to every recipient.
pub fn pay_each(env: &Env, asset: &Address, recipients: &Vec<Address>, share: i128) {
    if share <= 0 {
        return;
    }

    let token_client = token::Client::new(env, asset);
    let contract = env.current_contract_address();
    for recipient in recipients.iter() {
        token_client.transfer(&contract, &recipient, &share);
    }
}

/// Pull `amount` of `asset` from `from` into the contract.
pub fn collect(env: &Env, asset: &Address, from: &Address, amount: i128) {
    let token_client = token::Client::new(env, asset);
    token_client.transfer(from, &env.current_contract_address(), &amount);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_evenly() {
        assert_eq!(equal_split(20_000_000, 2), Ok((10_000_000, 0)));
    }

    #[test]
    fn remainder_is_bounded_by_participants() {
        for n in 1..=13u32 {
            let pool = 1_000_003i128;
            let (share, remainder) = equal_split(pool, n).unwrap();
            assert_eq!(share * n as i128 + remainder, pool);
            assert!(remainder < n as i128);
        }
    }

    #[test]
    fn zero_participants_rejected() {
        assert_eq!(equal_split(100, 0), Err(SummitError::NoVerifiedParticipants));
    }

    #[test]
    fn empty_pool_pays_nothing() {
        assert_eq!(equal_split(0, 3), Ok((0, 0)));
    }
}
