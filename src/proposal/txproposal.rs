//! Multi-signature transaction proposal aggregate
//!
//! A `TxProposal` tracks a draft spending transaction while co-signers
//! approve or reject it. It owns the quorum state machine, the
//! change-hiding output order, and the assembly of the (possibly partially
//! signed) raw transaction handed between signers.
//!
//! The aggregate is a plain synchronous value: callers serialize
//! concurrent mutations per proposal instance, recomputing status after
//! each applied action.

use std::fmt;

use chrono::Utc;
use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::estimate::estimated_tx_size;
use crate::core::script::{
    lock_script, multisig_redeem_script, p2pkh_unlock_script, p2sh_multisig_unlock_script,
    AddressType, ScriptError,
};
use crate::core::transaction::{RawInput, RawOutput, RawTransaction, TransactionError, TX_VERSION};
use crate::crypto::address::{Address, AddressError, Network};
use crate::crypto::hash::sha256;
use crate::crypto::keys::public_key_bytes_from_hex;
use crate::proposal::action::Action;

/// Current proposal record format version
pub const PROPOSAL_VERSION: u32 = 3;

// =============================================================================
// Errors
// =============================================================================

/// Proposal lifecycle errors
#[derive(Error, Debug)]
pub enum ProposalError {
    #[error("Invalid outputs: {0}")]
    InvalidOutputs(String),
    #[error("Invalid quorum configuration: {0}")]
    InvalidQuorum(String),
    #[error("Invalid output order: {0}")]
    InvalidPermutation(String),
    #[error("Insufficient funds: outputs {outputs} + fee {fee} exceed inputs {inputs}")]
    InsufficientFunds { inputs: u64, outputs: u64, fee: u64 },
    #[error("Signer {0} has already acted on this proposal")]
    DuplicateAction(String),
    #[error("Expected {expected} signatures (one per input), got {got}")]
    SignatureCountMismatch { expected: usize, got: usize },
    #[error("Signature {index} from signer {signer_id} is not valid hex")]
    InvalidSignature { signer_id: String, index: usize },
    #[error("Proposal is already {0}")]
    ProposalFinalized(ProposalStatus),
    #[error("Malformed proposal record: {0}")]
    MalformedRecord(String),
    #[error("Record serialization failed: {0}")]
    RecordSerialization(#[from] serde_json::Error),
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

// =============================================================================
// Status
// =============================================================================

/// Proposal lifecycle status, always derived from the action ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ProposalStatus {
    /// Terminal states absorb: no action leaves them
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProposalStatus::Pending)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Accepted => "accepted",
            ProposalStatus::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Value objects
// =============================================================================

/// A declared destination output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Output {
    pub to_address: String,
    /// Amount in the smallest currency unit; must be positive
    pub amount: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// A spendable input supplied by the wallet layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Input {
    pub txid: String,
    pub vout: u32,
    pub satoshis: u64,
    /// Hex locking script of the source output
    pub script_pub_key: String,
    pub address: String,
    pub path: String,
    /// Public keys authorized to spend, in the fixed order that drives
    /// multisig script construction
    pub public_keys: Vec<String>,
}

/// The change destination supplied by the wallet layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeAddress {
    pub version: String,
    pub created_on: i64,
    pub address: String,
    pub path: String,
    pub public_keys: Vec<String>,
}

// =============================================================================
// Creation parameters
// =============================================================================

/// Caller-supplied parameters for [`TxProposal::create`]
#[derive(Debug, Clone)]
pub struct ProposalParams {
    pub wallet_id: String,
    pub creator_id: String,
    /// Network configuration, passed explicitly rather than read from
    /// shared state
    pub network: Network,
    pub outputs: Vec<Output>,
    pub change_address: ChangeAddress,
    /// Spendable inputs; may still be empty at creation time
    pub inputs: Vec<Input>,
    pub fee: u64,
    pub required_signatures: u8,
    pub required_rejections: u8,
    pub wallet_n: u8,
    pub address_type: AddressType,
    pub message: Option<String>,
    /// Caller-assigned id; derived from the proposal details when absent
    pub id: Option<String>,
}

// =============================================================================
// Aggregate
// =============================================================================

/// A draft multi-signer spending transaction awaiting sufficient approvals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxProposal {
    pub version: u32,
    pub created_on: i64,
    pub id: String,
    pub wallet_id: String,
    pub creator_id: String,
    pub network: Network,
    /// Sum of the declared output amounts, excluding change and fee
    pub amount: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Authorization signature over the proposal's terms, not over a
    /// transaction input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal_signature: Option<String>,
    pub change_address: ChangeAddress,
    pub inputs: Vec<Input>,
    /// Derivation paths mirroring `inputs`
    pub input_paths: Vec<String>,
    pub required_signatures: u8,
    pub required_rejections: u8,
    pub wallet_n: u8,
    pub address_type: AddressType,
    pub status: ProposalStatus,
    pub actions: Vec<Action>,
    pub fee: u64,
    pub outputs: Vec<Output>,
    /// Placement permutation over `0..=outputs.len()`; the value
    /// `outputs.len()` marks the change position
    pub output_order: Vec<usize>,
}

impl TxProposal {
    // =========================================================================
    // Creation & deserialization
    // =========================================================================

    /// Create a new pending proposal from caller-supplied parameters.
    ///
    /// The output order is drawn fresh from a CSPRNG so the change output's
    /// final position cannot be inferred from declaration order.
    pub fn create(params: ProposalParams) -> Result<Self, ProposalError> {
        if params.outputs.is_empty() {
            return Err(ProposalError::InvalidOutputs("no outputs specified".to_string()));
        }
        for (index, output) in params.outputs.iter().enumerate() {
            if output.amount == 0 {
                return Err(ProposalError::InvalidOutputs(format!(
                    "output {} has a non-positive amount",
                    index
                )));
            }
        }
        if params.required_signatures == 0 || params.required_signatures > params.wallet_n {
            return Err(ProposalError::InvalidQuorum(format!(
                "requiredSignatures {} out of range for wallet of {}",
                params.required_signatures, params.wallet_n
            )));
        }
        if params.required_rejections == 0 || params.required_rejections > params.wallet_n {
            return Err(ProposalError::InvalidQuorum(format!(
                "requiredRejections {} out of range for wallet of {}",
                params.required_rejections, params.wallet_n
            )));
        }

        let amount: u64 = params.outputs.iter().map(|o| o.amount).sum();

        if !params.inputs.is_empty() {
            let total_in: u64 = params.inputs.iter().map(|i| i.satoshis).sum();
            let covered = amount
                .checked_add(params.fee)
                .map(|needed| needed <= total_in)
                .unwrap_or(false);
            if !covered {
                return Err(ProposalError::InsufficientFunds {
                    inputs: total_in,
                    outputs: amount,
                    fee: params.fee,
                });
            }
        }

        let mut output_order: Vec<usize> = (0..=params.outputs.len()).collect();
        output_order.shuffle(&mut OsRng);

        let id = params.id.clone().unwrap_or_else(|| {
            derive_id(&params.wallet_id, &params.creator_id, amount, params.inputs.len())
        });
        let input_paths = params.inputs.iter().map(|i| i.path.clone()).collect();

        log::debug!(
            "created proposal {} ({} outputs, {} sat)",
            id,
            params.outputs.len(),
            amount
        );

        Ok(Self {
            version: PROPOSAL_VERSION,
            created_on: Utc::now().timestamp(),
            id,
            wallet_id: params.wallet_id,
            creator_id: params.creator_id,
            network: params.network,
            amount,
            message: params.message,
            proposal_signature: None,
            change_address: params.change_address,
            inputs: params.inputs,
            input_paths,
            required_signatures: params.required_signatures,
            required_rejections: params.required_rejections,
            wallet_n: params.wallet_n,
            address_type: params.address_type,
            status: ProposalStatus::Pending,
            actions: Vec::new(),
            fee: params.fee,
            outputs: params.outputs,
            output_order,
        })
    }

    /// Reconstruct a proposal from its persisted record.
    ///
    /// The record is a trusted copy validated at creation time, so this is
    /// a pure field-for-field reconstruction; only structurally missing or
    /// mistyped fields fail.
    pub fn from_obj(record: serde_json::Value) -> Result<Self, ProposalError> {
        serde_json::from_value(record).map_err(|e| ProposalError::MalformedRecord(e.to_string()))
    }

    /// The persisted representation; `from_obj` round-trips it unchanged
    pub fn to_obj(&self) -> Result<serde_json::Value, ProposalError> {
        Ok(serde_json::to_value(self)?)
    }

    // =========================================================================
    // Quorum state machine
    // =========================================================================

    /// Record an approval from `signer_id` carrying one signature per input.
    ///
    /// The signer's extended public key is stored alongside so downstream
    /// validators can tie the signatures back to input public keys.
    pub fn sign(
        &mut self,
        signer_id: &str,
        signatures: Vec<String>,
        xpub: Option<String>,
    ) -> Result<(), ProposalError> {
        self.ensure_open()?;
        self.ensure_has_not_acted(signer_id)?;
        if signatures.len() != self.inputs.len() {
            return Err(ProposalError::SignatureCountMismatch {
                expected: self.inputs.len(),
                got: signatures.len(),
            });
        }
        for (index, signature) in signatures.iter().enumerate() {
            if hex::decode(signature).is_err() {
                return Err(ProposalError::InvalidSignature {
                    signer_id: signer_id.to_string(),
                    index,
                });
            }
        }

        log::debug!("proposal {}: approval from {}", self.id, signer_id);
        self.actions.push(Action::approve(signer_id, signatures, xpub));
        self.update_status();
        Ok(())
    }

    /// Record a rejection from `signer_id`
    pub fn reject(&mut self, signer_id: &str) -> Result<(), ProposalError> {
        self.ensure_open()?;
        self.ensure_has_not_acted(signer_id)?;

        log::debug!("proposal {}: rejection from {}", self.id, signer_id);
        self.actions.push(Action::reject(signer_id));
        self.update_status();
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.status == ProposalStatus::Pending
    }

    pub fn is_accepted(&self) -> bool {
        self.status == ProposalStatus::Accepted
    }

    pub fn is_rejected(&self) -> bool {
        self.status == ProposalStatus::Rejected
    }

    fn ensure_open(&self) -> Result<(), ProposalError> {
        if self.status.is_terminal() {
            return Err(ProposalError::ProposalFinalized(self.status));
        }
        Ok(())
    }

    fn ensure_has_not_acted(&self, signer_id: &str) -> Result<(), ProposalError> {
        if self.actions.iter().any(|a| a.signer_id == signer_id) {
            return Err(ProposalError::DuplicateAction(signer_id.to_string()));
        }
        Ok(())
    }

    /// Recompute status from the full ledger.
    ///
    /// Invoked after every recorded action: a rejection quorum reached
    /// after a partial approval count still finalizes the proposal.
    fn update_status(&mut self) {
        let approvals = self.actions.iter().filter(|a| a.is_approval()).count();
        let rejections = self.actions.iter().filter(|a| a.is_rejection()).count();

        let next = if rejections >= self.required_rejections as usize {
            ProposalStatus::Rejected
        } else if approvals >= self.required_signatures as usize {
            ProposalStatus::Accepted
        } else {
            ProposalStatus::Pending
        };

        if next != self.status {
            log::info!("proposal {} is now {}", self.id, next);
            self.status = next;
        }
    }

    // =========================================================================
    // Amounts & size
    // =========================================================================

    /// The cached sum of declared output amounts, excluding change and fee
    pub fn total_amount(&self) -> u64 {
        self.amount
    }

    /// Value returned to the change address
    pub fn change_amount(&self) -> Result<u64, ProposalError> {
        let total_in: u64 = self.inputs.iter().map(|i| i.satoshis).sum();
        self.amount
            .checked_add(self.fee)
            .and_then(|needed| total_in.checked_sub(needed))
            .ok_or(ProposalError::InsufficientFunds {
                inputs: total_in,
                outputs: self.amount,
                fee: self.fee,
            })
    }

    /// Expected serialized size in bytes, assuming a fully signed
    /// transaction with worst-case signature sizes
    pub fn estimated_size(&self) -> usize {
        estimated_tx_size(
            self.inputs.len(),
            self.outputs.len(),
            self.address_type,
            self.required_signatures,
            self.wallet_n,
        )
    }

    // =========================================================================
    // Output ordering
    // =========================================================================

    fn validate_output_order(&self) -> Result<(), ProposalError> {
        let expected = self.outputs.len() + 1;
        if self.output_order.len() != expected {
            return Err(ProposalError::InvalidPermutation(format!(
                "expected {} entries, got {}",
                expected,
                self.output_order.len()
            )));
        }
        let mut seen = vec![false; expected];
        for &slot in &self.output_order {
            if slot >= expected {
                return Err(ProposalError::InvalidPermutation(format!(
                    "entry {} out of range",
                    slot
                )));
            }
            if seen[slot] {
                return Err(ProposalError::InvalidPermutation(format!(
                    "duplicate entry {}",
                    slot
                )));
            }
            seen[slot] = true;
        }
        Ok(())
    }

    /// Final position of the synthesized change output
    pub fn change_output_index(&self) -> Result<usize, ProposalError> {
        self.validate_output_order()?;
        let sentinel = self.outputs.len();
        self.output_order
            .iter()
            .position(|&slot| slot == sentinel)
            .ok_or_else(|| {
                ProposalError::InvalidPermutation("missing change position".to_string())
            })
    }

    /// Wire outputs in their final order: declared outputs permuted by
    /// `output_order`, with the change output synthesized at the sentinel
    /// position
    pub fn ordered_outputs(&self) -> Result<Vec<RawOutput>, ProposalError> {
        self.validate_output_order()?;
        let change = self.change_amount()?;

        let mut ordered = Vec::with_capacity(self.output_order.len());
        for &slot in &self.output_order {
            let (address, satoshis) = if slot < self.outputs.len() {
                let output = &self.outputs[slot];
                (output.to_address.as_str(), output.amount)
            } else {
                (self.change_address.address.as_str(), change)
            };
            let decoded = Address::decode(address, self.network)?;
            ordered.push(RawOutput {
                satoshis,
                script_pubkey: lock_script(&decoded),
            });
        }
        Ok(ordered)
    }

    // =========================================================================
    // Transaction assembly
    // =========================================================================

    /// Signatures recorded for one input position, in action order
    fn collected_signatures(&self, input_index: usize) -> Result<Vec<Vec<u8>>, ProposalError> {
        let mut signatures = Vec::new();
        for action in self.actions.iter().filter(|a| a.is_approval()) {
            if let Some(sig_hex) = action.signatures.get(input_index) {
                let sig = hex::decode(sig_hex).map_err(|_| ProposalError::InvalidSignature {
                    signer_id: action.signer_id.clone(),
                    index: input_index,
                })?;
                signatures.push(sig);
            }
        }
        Ok(signatures)
    }

    fn unlock_script(&self, input_index: usize, input: &Input) -> Result<Vec<u8>, ProposalError> {
        let signatures = self.collected_signatures(input_index)?;
        match self.address_type {
            AddressType::P2sh => {
                let redeem = multisig_redeem_script(
                    &input.public_keys,
                    self.required_signatures as usize,
                )?;
                Ok(p2sh_multisig_unlock_script(&signatures, &redeem))
            }
            AddressType::P2pkh => {
                let Some(signature) = signatures.first() else {
                    return Ok(Vec::new());
                };
                let key = input
                    .public_keys
                    .first()
                    .ok_or(ScriptError::MissingPublicKey)?;
                let key_bytes = public_key_bytes_from_hex(key).map_err(ScriptError::from)?;
                Ok(p2pkh_unlock_script(signature, &key_bytes))
            }
        }
    }

    /// Assemble the transaction with whatever signatures are recorded so
    /// far. This is a transport form until the full signature threshold is
    /// embedded.
    pub fn raw_transaction(&self) -> Result<RawTransaction, ProposalError> {
        let outputs = self.ordered_outputs()?;
        let mut inputs = Vec::with_capacity(self.inputs.len());
        for (index, input) in self.inputs.iter().enumerate() {
            let script_sig = self.unlock_script(index, input)?;
            inputs.push(RawInput::new(&input.txid, input.vout, script_sig)?);
        }
        Ok(RawTransaction {
            version: TX_VERSION,
            inputs,
            outputs,
            locktime: 0,
        })
    }

    /// Lowercase hex of the canonical serialized transaction
    pub fn raw_tx(&self) -> Result<String, ProposalError> {
        Ok(self.raw_transaction()?.to_hex())
    }
}

/// Identifier derived from the proposal details plus a nanosecond timestamp
fn derive_id(wallet_id: &str, creator_id: &str, amount: u64, n_inputs: usize) -> String {
    let id_data = format!(
        "{}{}{}{}{}",
        wallet_id,
        creator_id,
        amount,
        Utc::now().timestamp_nanos_opt().unwrap_or(0),
        n_inputs
    );
    hex::encode(&sha256(id_data.as_bytes())[..16])
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const THE_XPUB: &str = "xpub661MyMwAqRbcFLRkhYzK8eQdoywNHJVsJCMQNDoMks5bZymuMcyDgYfnVQYq2Q9npnVmdTAthYGc3N3uxm5sEdnTpSqBc4YYTAhNnoSxCm9";
    const THE_SIGNATURE: &str = "3045022100a6066595dde81370d67c8a6ae16f65c37bf467a4e666a4b50ea0fa303a93291d022027d9877c85875decc9a7070c2ccebe58f1215095af7624e1a935b4185646436b";
    const THE_RAW_TX: &str = "0100000001ab069f7073be9b491bb1ad4233a45d2e383082ccc7206df905662d6d8499e66e080000009200483045022100a6066595dde81370d67c8a6ae16f65c37bf467a4e666a4b50ea0fa303a93291d022027d9877c85875decc9a7070c2ccebe58f1215095af7624e1a935b4185646436b414752210319008ffe1b3e208f5ebed8f46495c056763f87b07930a7027a92ee477fb0cb0f2103b5f035af8be40d0db5abb306b7754949ab39032cf99ad177691753b37d10130152aeffffffff0380969800000000001976a91451224bca38efcaa31d5340917c3f3f713b8b20e488ac002d3101000000001976a91451224bca38efcaa31d5340917c3f3f713b8b20e488ac70f62b040000000017a914778192003f0e9e1d865c082179cc3dae5464b03d8700000000";

    fn the_signatures() -> Vec<String> {
        vec![THE_SIGNATURE.to_string()]
    }

    fn a_change_address() -> ChangeAddress {
        ChangeAddress {
            version: "1.0.0".to_string(),
            created_on: 1424372337,
            address: "HHR21sjZ6yz6o7v124aMQBu4eGa4RBdUdS".to_string(),
            path: "m/2147483647/1/0".to_string(),
            public_keys: vec![
                "030562cb099e6043dc499eb359dd97c9d500a3586498e4bcf0228a178cc20e6f16".to_string(),
                "0367027d17dbdfc27b5e31f8ed70e14d47949f0fa392261e977db0851c8b0d6fac".to_string(),
                "0315ae1e8aa866794ae603389fb2b8549153ebf04e7cdf74501dadde5c75ddad11".to_string(),
            ],
        }
    }

    fn some_outputs() -> Vec<Output> {
        vec![
            Output {
                to_address: "CPrtPWbp8cCftTQu5fzuLG5zPJNDHMMf8X".to_string(),
                amount: 10_000_000,
                message: Some("first message".to_string()),
            },
            Output {
                to_address: "CPrtPWbp8cCftTQu5fzuLG5zPJNDHMMf8X".to_string(),
                amount: 20_000_000,
                message: Some("second message".to_string()),
            },
        ]
    }

    fn a_params() -> ProposalParams {
        ProposalParams {
            wallet_id: "1".to_string(),
            creator_id: "1".to_string(),
            network: Network::Livenet,
            outputs: some_outputs(),
            change_address: a_change_address(),
            inputs: Vec::new(),
            fee: 0,
            required_signatures: 2,
            required_rejections: 1,
            wallet_n: 2,
            address_type: AddressType::P2sh,
            message: Some("some message".to_string()),
            id: None,
        }
    }

    fn a_txp_record() -> serde_json::Value {
        json!({
            "version": 3,
            "createdOn": 1423146231,
            "id": "75c34f49-1ed6-255f-e9fd-0c71ae75ed1e",
            "walletId": "1",
            "creatorId": "1",
            "network": "livenet",
            "amount": 30000000,
            "message": "some message",
            "proposalSignature": "7035022100896aeb8db75fec22fddb5facf791927a996eb3aee23ee6deaa15471ea46047de02204c0c33f42a9d3ff93d62738712a8c8a5ecd21b45393fdd144e7b01b5a186f1f9",
            "changeAddress": {
                "version": "1.0.0",
                "createdOn": 1424372337,
                "address": "HHR21sjZ6yz6o7v124aMQBu4eGa4RBdUdS",
                "path": "m/2147483647/1/0",
                "publicKeys": [
                    "030562cb099e6043dc499eb359dd97c9d500a3586498e4bcf0228a178cc20e6f16",
                    "0367027d17dbdfc27b5e31f8ed70e14d47949f0fa392261e977db0851c8b0d6fac",
                    "0315ae1e8aa866794ae603389fb2b8549153ebf04e7cdf74501dadde5c75ddad11"
                ]
            },
            "inputs": [{
                "txid": "6ee699846d2d6605f96d20c7cc8230382e5da43342adb11b499bbe73709f06ab",
                "vout": 8,
                "satoshis": 100000000,
                "scriptPubKey": "a914a8a9648754fbda1b6c208ac9d4e252075447f36887",
                "address": "HMtvqBXNuhiizxofi9LC5tT69M3RRLu1FT",
                "path": "m/2147483647/0/1",
                "publicKeys": [
                    "0319008ffe1b3e208f5ebed8f46495c056763f87b07930a7027a92ee477fb0cb0f",
                    "03b5f035af8be40d0db5abb306b7754949ab39032cf99ad177691753b37d101301"
                ]
            }],
            "inputPaths": ["m/2147483647/0/1"],
            "requiredSignatures": 2,
            "requiredRejections": 1,
            "walletN": 2,
            "addressType": "P2SH",
            "status": "pending",
            "actions": [],
            "fee": 10000,
            "outputs": [{
                "toAddress": "CPrtPWbp8cCftTQu5fzuLG5zPJNDHMMf8X",
                "amount": 10000000,
                "message": "first message"
            }, {
                "toAddress": "CPrtPWbp8cCftTQu5fzuLG5zPJNDHMMf8X",
                "amount": 20000000,
                "message": "second message"
            }],
            "outputOrder": [0, 1, 2]
        })
    }

    fn a_txp() -> TxProposal {
        TxProposal::from_obj(a_txp_record()).unwrap()
    }

    // =========================================================================
    // Creation
    // =========================================================================

    #[test]
    fn test_create() {
        let txp = TxProposal::create(a_params()).unwrap();
        assert_eq!(txp.outputs.len(), 2);
        assert_eq!(txp.amount, 30_000_000);
        assert_eq!(txp.network, Network::Livenet);
        assert_eq!(txp.status, ProposalStatus::Pending);
        assert_eq!(txp.version, PROPOSAL_VERSION);
        assert_eq!(txp.output_order.len(), 3);
        assert!(!txp.id.is_empty());
        assert!(txp.actions.is_empty());
        // the generated order is a valid permutation with a change slot
        assert!(txp.change_output_index().unwrap() < 3);
    }

    #[test]
    fn test_create_rejects_empty_outputs() {
        let mut params = a_params();
        params.outputs.clear();
        assert!(matches!(
            TxProposal::create(params),
            Err(ProposalError::InvalidOutputs(_))
        ));
    }

    #[test]
    fn test_create_rejects_zero_amount_output() {
        let mut params = a_params();
        params.outputs[1].amount = 0;
        assert!(matches!(
            TxProposal::create(params),
            Err(ProposalError::InvalidOutputs(_))
        ));
    }

    #[test]
    fn test_create_rejects_bad_quorum() {
        let mut params = a_params();
        params.required_signatures = 3;
        assert!(matches!(
            TxProposal::create(params),
            Err(ProposalError::InvalidQuorum(_))
        ));

        let mut params = a_params();
        params.required_rejections = 0;
        assert!(matches!(
            TxProposal::create(params),
            Err(ProposalError::InvalidQuorum(_))
        ));
    }

    #[test]
    fn test_create_rejects_insufficient_funds() {
        let mut params = a_params();
        params.inputs = a_txp().inputs;
        params.inputs[0].satoshis = 100;
        params.fee = 10_000;
        assert!(matches!(
            TxProposal::create(params),
            Err(ProposalError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn test_create_mirrors_input_paths() {
        let mut params = a_params();
        params.inputs = a_txp().inputs;
        let txp = TxProposal::create(params).unwrap();
        assert_eq!(txp.input_paths, vec!["m/2147483647/0/1".to_string()]);
    }

    #[test]
    fn test_create_uses_supplied_id() {
        let mut params = a_params();
        params.id = Some("my-id".to_string());
        let txp = TxProposal::create(params).unwrap();
        assert_eq!(txp.id, "my-id");
    }

    // =========================================================================
    // Deserialization
    // =========================================================================

    #[test]
    fn test_from_obj() {
        let txp = a_txp();
        assert_eq!(txp.amount, 30_000_000);
        assert_eq!(txp.wallet_id, "1");
        assert_eq!(txp.fee, 10_000);
        assert_eq!(txp.inputs.len(), 1);
        assert_eq!(txp.address_type, AddressType::P2sh);
        assert_eq!(txp.status, ProposalStatus::Pending);
        assert_eq!(txp.output_order, vec![0, 1, 2]);
    }

    #[test]
    fn test_from_obj_rejects_missing_field() {
        let mut record = a_txp_record();
        record.as_object_mut().unwrap().remove("walletId");
        assert!(matches!(
            TxProposal::from_obj(record),
            Err(ProposalError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_round_trip_preserves_all_fields() {
        let txp = a_txp();
        let back = TxProposal::from_obj(txp.to_obj().unwrap()).unwrap();
        assert_eq!(back, txp);

        let created = TxProposal::create(a_params()).unwrap();
        let back = TxProposal::from_obj(created.to_obj().unwrap()).unwrap();
        assert_eq!(back, created);
    }

    #[test]
    fn test_record_uses_wire_field_names() {
        let obj = a_txp().to_obj().unwrap();
        assert_eq!(obj["walletId"], "1");
        assert_eq!(obj["outputOrder"], json!([0, 1, 2]));
        assert_eq!(obj["inputs"][0]["scriptPubKey"], "a914a8a9648754fbda1b6c208ac9d4e252075447f36887");
        assert_eq!(obj["changeAddress"]["publicKeys"].as_array().unwrap().len(), 3);
        assert_eq!(obj["outputs"][0]["toAddress"], "CPrtPWbp8cCftTQu5fzuLG5zPJNDHMMf8X");
        assert_eq!(obj["addressType"], "P2SH");
        assert_eq!(obj["network"], "livenet");
        assert_eq!(obj["status"], "pending");
    }

    // =========================================================================
    // Output ordering
    // =========================================================================

    #[test]
    fn test_change_output_follows_output_order() {
        let mut txp = a_txp();

        txp.output_order = vec![0, 1, 2];
        assert_eq!(txp.change_output_index().unwrap(), 2);
        let outputs = txp.ordered_outputs().unwrap();
        assert_eq!(outputs[0].satoshis, 10_000_000);
        assert_eq!(outputs[1].satoshis, 20_000_000);
        assert_eq!(outputs[2].satoshis, 69_990_000);

        txp.output_order = vec![2, 0, 1];
        assert_eq!(txp.change_output_index().unwrap(), 0);
        let outputs = txp.ordered_outputs().unwrap();
        assert_eq!(outputs[0].satoshis, 69_990_000);
        assert_eq!(outputs[1].satoshis, 10_000_000);
        assert_eq!(outputs[2].satoshis, 20_000_000);
        // change pays to the P2SH change address
        assert_eq!(
            hex::encode(&outputs[0].script_pubkey),
            "a914778192003f0e9e1d865c082179cc3dae5464b03d87"
        );
    }

    #[test]
    fn test_rejects_malformed_output_order() {
        let mut txp = a_txp();

        txp.output_order = vec![0, 1];
        assert!(matches!(
            txp.ordered_outputs(),
            Err(ProposalError::InvalidPermutation(_))
        ));

        txp.output_order = vec![0, 1, 3];
        assert!(matches!(
            txp.ordered_outputs(),
            Err(ProposalError::InvalidPermutation(_))
        ));

        txp.output_order = vec![0, 1, 1];
        assert!(matches!(
            txp.ordered_outputs(),
            Err(ProposalError::InvalidPermutation(_))
        ));
    }

    #[test]
    fn test_assembly_rejects_insufficient_funds() {
        let mut txp = a_txp();
        txp.fee = 200_000_000;
        assert!(matches!(
            txp.ordered_outputs(),
            Err(ProposalError::InsufficientFunds { .. })
        ));
    }

    // =========================================================================
    // Amounts & size
    // =========================================================================

    #[test]
    fn test_total_amount() {
        let txp = a_txp();
        assert_eq!(txp.total_amount(), txp.amount);
    }

    #[test]
    fn test_change_amount() {
        assert_eq!(a_txp().change_amount().unwrap(), 69_990_000);
    }

    #[test]
    fn test_estimated_size() {
        assert_eq!(a_txp().estimated_size(), 396);
    }

    // =========================================================================
    // Signing & rejection
    // =========================================================================

    #[test]
    fn test_sign_2_of_2() {
        let mut txp = a_txp();

        txp.sign("1", the_signatures(), Some(THE_XPUB.to_string())).unwrap();
        assert!(!txp.is_accepted());
        assert!(!txp.is_rejected());

        txp.sign("2", the_signatures(), Some(THE_XPUB.to_string())).unwrap();
        assert!(txp.is_accepted());
        assert!(!txp.is_rejected());
        assert_eq!(txp.actions.len(), 2);
    }

    #[test]
    fn test_sign_rejects_wrong_signature_count() {
        let mut txp = a_txp();
        let result = txp.sign(
            "1",
            vec![THE_SIGNATURE.to_string(), THE_SIGNATURE.to_string()],
            None,
        );
        assert!(matches!(
            result,
            Err(ProposalError::SignatureCountMismatch { expected: 1, got: 2 })
        ));
        assert!(txp.actions.is_empty());
    }

    #[test]
    fn test_sign_rejects_non_hex_signature() {
        let mut txp = a_txp();
        let result = txp.sign("1", vec!["not hex".to_string()], None);
        assert!(matches!(
            result,
            Err(ProposalError::InvalidSignature { index: 0, .. })
        ));
    }

    #[test]
    fn test_duplicate_action_rejected_regardless_of_kind() {
        let mut txp = a_txp();
        txp.sign("1", the_signatures(), None).unwrap();

        assert!(matches!(
            txp.sign("1", the_signatures(), None),
            Err(ProposalError::DuplicateAction(_))
        ));
        assert!(matches!(
            txp.reject("1"),
            Err(ProposalError::DuplicateAction(_))
        ));
    }

    #[test]
    fn test_reject_2_of_2() {
        let mut txp = a_txp();
        txp.reject("1").unwrap();
        assert!(!txp.is_accepted());
        assert!(txp.is_rejected());
    }

    #[test]
    fn test_sign_then_reject_finally_rejects() {
        let mut txp = a_txp();
        txp.sign("1", the_signatures(), None).unwrap();
        assert!(!txp.is_accepted());
        assert!(!txp.is_rejected());

        txp.reject("2").unwrap();
        assert!(!txp.is_accepted());
        assert!(txp.is_rejected());
    }

    #[test]
    fn test_terminal_state_freezes_proposal() {
        let mut txp = a_txp();
        txp.reject("1").unwrap();
        assert!(matches!(
            txp.sign("2", the_signatures(), None),
            Err(ProposalError::ProposalFinalized(ProposalStatus::Rejected))
        ));
        assert!(matches!(
            txp.reject("2"),
            Err(ProposalError::ProposalFinalized(ProposalStatus::Rejected))
        ));

        let mut txp = a_txp();
        txp.sign("1", the_signatures(), None).unwrap();
        txp.sign("2", the_signatures(), None).unwrap();
        assert!(matches!(
            txp.reject("3"),
            Err(ProposalError::ProposalFinalized(ProposalStatus::Accepted))
        ));
    }

    // =========================================================================
    // Raw transaction
    // =========================================================================

    #[test]
    fn test_raw_tx_for_signed_2_of_2() {
        let mut txp = a_txp();
        txp.sign("1", the_signatures(), Some(THE_XPUB.to_string())).unwrap();
        assert_eq!(txp.raw_tx().unwrap(), THE_RAW_TX);
    }

    #[test]
    fn test_signed_txid() {
        let mut txp = a_txp();
        txp.sign("1", the_signatures(), Some(THE_XPUB.to_string())).unwrap();
        assert_eq!(
            txp.raw_transaction().unwrap().txid(),
            "58828d449becff4f869b851907c85b7351b763d8b68a9a0ce06b52349f546f7c"
        );
    }

    #[test]
    fn test_unsigned_raw_transaction_is_transport_form() {
        let txp = a_txp();
        let raw = txp.raw_transaction().unwrap();
        // OP_0 plus the redeem-script push, no signatures yet
        assert_eq!(raw.inputs[0].script_sig.len(), 73);
        assert_eq!(raw.inputs[0].script_sig[0], 0x00);
        assert_eq!(raw.outputs.len(), 3);
    }
}
