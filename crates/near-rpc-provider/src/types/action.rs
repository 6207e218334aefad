//! Transaction actions.
//!
//! Variant order is the borsh tag and must match the protocol.

use borsh::{BorshDeserialize, BorshSerialize};
use near_account_id::AccountId;
use near_gas::NearGas;
use near_token::NearToken;
use serde::{Deserialize, Serialize};

use super::PublicKey;

/// What an access key may do. Tag 0 is `FunctionCall`, tag 1 is `FullAccess`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum AccessKeyPermission {
    FunctionCall(FunctionCallPermission),
    FullAccess,
}

/// Restrictions on a function-call access key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct FunctionCallPermission {
    /// Spending cap; `None` is unlimited.
    pub allowance: Option<NearToken>,
    pub receiver_id: AccountId,
    /// Callable methods; empty means any.
    pub method_names: Vec<String>,
}

/// An access key as carried by `AddKey`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct AccessKey {
    pub nonce: u64,
    pub permission: AccessKeyPermission,
}

impl AccessKey {
    /// A fresh full-access key.
    pub fn full_access() -> Self {
        Self {
            nonce: 0,
            permission: AccessKeyPermission::FullAccess,
        }
    }
}

/// A single transaction action.
///
/// Delegate actions (tag 8) are not modeled and fail to decode.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Action {
    CreateAccount,
    DeployContract {
        code: Vec<u8>,
    },
    FunctionCall {
        method_name: String,
        args: Vec<u8>,
        gas: NearGas,
        deposit: NearToken,
    },
    Transfer {
        deposit: NearToken,
    },
    Stake {
        stake: NearToken,
        public_key: PublicKey,
    },
    AddKey {
        public_key: PublicKey,
        access_key: AccessKey,
    },
    DeleteKey {
        public_key: PublicKey,
    },
    DeleteAccount {
        beneficiary_id: AccountId,
    },
}

impl Action {
    /// Transfer `deposit` to the receiver.
    pub fn transfer(deposit: NearToken) -> Self {
        Self::Transfer { deposit }
    }

    /// Call `method_name` on the receiver.
    pub fn function_call(
        method_name: impl Into<String>,
        args: Vec<u8>,
        gas: NearGas,
        deposit: NearToken,
    ) -> Self {
        Self::FunctionCall {
            method_name: method_name.into(),
            args,
            gas,
            deposit,
        }
    }

    /// Add a full-access key.
    pub fn add_full_access_key(public_key: PublicKey) -> Self {
        Self::AddKey {
            public_key,
            access_key: AccessKey::full_access(),
        }
    }

    /// Protocol name of this action kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::CreateAccount => "CreateAccount",
            Action::DeployContract { .. } => "DeployContract",
            Action::FunctionCall { .. } => "FunctionCall",
            Action::Transfer { .. } => "Transfer",
            Action::Stake { .. } => "Stake",
            Action::AddKey { .. } => "AddKey",
            Action::DeleteKey { .. } => "DeleteKey",
            Action::DeleteAccount { .. } => "DeleteAccount",
        }
    }
}
