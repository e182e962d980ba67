//! Solidity interfaces of the deployed contracts

use alloy::sol;

sol! {
    /// Aggregating money market: one market per supported token
    #[sol(rpc)]
    interface IMetaMoneyMarket {
        function supportedMarketsCount() external view returns (uint256);
        function supportedMarketsList(uint256 index) external view returns (address);
        function getMarketSymbol(address token) external view returns (string);
        function getBestInterestRate(address token) external view returns (uint256);
        function getDepositedAmount(address token, address account) external view returns (uint256);

        function deposit(address token, uint256 amount) external;
        function withdraw(address token, uint256 amount) external;
    }
}

sol! {
    /// Subset of ERC-20 the client touches
    #[sol(rpc)]
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function approve(address spender, uint256 amount) external returns (bool);
    }
}
