//! Transaction builder for money market writes

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use std::fmt;

use metamoney_contracts::abi::{IMetaMoneyMarket, IERC20};
use metamoney_core::{ExecutionError, ExecutionResult};

const DEPOSIT_GAS: u64 = 250_000;
const WITHDRAW_GAS: u64 = 250_000;
const APPROVE_GAS: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxAction {
    Deposit,
    Withdraw,
    Approve,
}

impl fmt::Display for TxAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxAction::Deposit => write!(f, "deposit"),
            TxAction::Withdraw => write!(f, "withdraw"),
            TxAction::Approve => write!(f, "approve"),
        }
    }
}

/// Built transaction ready for submission
#[derive(Debug, Clone)]
pub struct BuiltTransaction {
    pub action: TxAction,
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub gas_limit: u64,
}

/// Transaction builder
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    money_market: Address,
}

impl TransactionBuilder {
    pub fn new(money_market: Address) -> Self {
        Self { money_market }
    }

    pub fn money_market(&self) -> Address {
        self.money_market
    }

    /// Move `amount` of `token` from `from` into the money market
    pub fn build_deposit(
        &self,
        from: Address,
        token: Address,
        amount: U256,
    ) -> ExecutionResult<BuiltTransaction> {
        ensure_nonzero(amount)?;
        let call = IMetaMoneyMarket::depositCall { token, amount };
        Ok(self.call(TxAction::Deposit, from, self.money_market, call.abi_encode(), DEPOSIT_GAS))
    }

    /// Pull `amount` of `token` back out to `from`
    pub fn build_withdraw(
        &self,
        from: Address,
        token: Address,
        amount: U256,
    ) -> ExecutionResult<BuiltTransaction> {
        ensure_nonzero(amount)?;
        let call = IMetaMoneyMarket::withdrawCall { token, amount };
        Ok(self.call(TxAction::Withdraw, from, self.money_market, call.abi_encode(), WITHDRAW_GAS))
    }

    /// Let the money market spend `amount` of `token`; required before a deposit
    pub fn build_approve(
        &self,
        from: Address,
        token: Address,
        amount: U256,
    ) -> ExecutionResult<BuiltTransaction> {
        ensure_nonzero(amount)?;
        let call = IERC20::approveCall {
            spender: self.money_market,
            amount,
        };
        Ok(self.call(TxAction::Approve, from, token, call.abi_encode(), APPROVE_GAS))
    }

    fn call(
        &self,
        action: TxAction,
        from: Address,
        to: Address,
        data: Vec<u8>,
        gas_limit: u64,
    ) -> BuiltTransaction {
        BuiltTransaction {
            action,
            from,
            to,
            value: U256::ZERO,
            data: Bytes::from(data),
            gas_limit,
        }
    }
}

fn ensure_nonzero(amount: U256) -> ExecutionResult<()> {
    if amount.is_zero() {
        return Err(ExecutionError::ZeroAmount);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addrs() -> (Address, Address, Address) {
        (
            Address::repeat_byte(0xaa),
            Address::repeat_byte(0x11),
            Address::repeat_byte(0x22),
        )
    }

    #[test]
    fn test_deposit_targets_money_market() {
        let (market, token, user) = addrs();
        let builder = TransactionBuilder::new(market);
        let tx = builder.build_deposit(user, token, U256::from(500u64)).unwrap();

        assert_eq!(tx.action, TxAction::Deposit);
        assert_eq!(tx.to, market);
        assert_eq!(tx.from, user);
        assert_eq!(tx.value, U256::ZERO);
        assert_eq!(&tx.data[..4], &IMetaMoneyMarket::depositCall::SELECTOR[..]);

        let decoded = IMetaMoneyMarket::depositCall::abi_decode(&tx.data, true).unwrap();
        assert_eq!(decoded.token, token);
        assert_eq!(decoded.amount, U256::from(500u64));
    }

    #[test]
    fn test_withdraw_uses_its_own_selector() {
        let (market, token, user) = addrs();
        let builder = TransactionBuilder::new(market);
        let tx = builder.build_withdraw(user, token, U256::from(1u64)).unwrap();

        assert_eq!(&tx.data[..4], &IMetaMoneyMarket::withdrawCall::SELECTOR[..]);
        assert_ne!(
            IMetaMoneyMarket::withdrawCall::SELECTOR,
            IMetaMoneyMarket::depositCall::SELECTOR
        );
        // selector plus two words
        assert_eq!(tx.data.len(), 4 + 64);
    }

    #[test]
    fn test_approve_goes_to_token() {
        let (market, token, user) = addrs();
        let builder = TransactionBuilder::new(market);
        let tx = builder.build_approve(user, token, U256::MAX).unwrap();

        assert_eq!(tx.to, token);
        assert_eq!(&tx.data[..4], &[0x09, 0x5e, 0xa7, 0xb3]);

        let decoded = IERC20::approveCall::abi_decode(&tx.data, true).unwrap();
        assert_eq!(decoded.spender, market);
        assert_eq!(decoded.amount, U256::MAX);
    }

    #[test]
    fn test_zero_amount_rejected() {
        let (market, token, user) = addrs();
        let builder = TransactionBuilder::new(market);

        assert!(matches!(
            builder.build_deposit(user, token, U256::ZERO),
            Err(ExecutionError::ZeroAmount)
        ));
        assert!(matches!(
            builder.build_withdraw(user, token, U256::ZERO),
            Err(ExecutionError::ZeroAmount)
        ));
        assert!(matches!(
            builder.build_approve(user, token, U256::ZERO),
            Err(ExecutionError::ZeroAmount)
        ));
    }
}
