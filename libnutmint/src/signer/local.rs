use crate::amount::Unit;
use crate::crypto::dleq::generate_dleq;
use crate::crypto::{bdhke, CurvePoint};
use crate::helpers::Timestamp;
use crate::keyset::{IdVersion, KeysetId, KeysetInfo, KeysetKeys, KeysetSnapshot, MasterKey, Seed, SeedParams};
use crate::mint::types::{BlindSignature, BlindedMessage, Proof, RecoverSig};
use crate::signer::error::SignerError;
use crate::signer::traits::{RotateArgs, Signer, SpendContext};
use crate::spend_condition::sig_all::{requires_sig_all, verify_output_witnesses, verify_sig_all};
use crate::spend_condition::{verify_condition, Secret, SpendConditionError, Witness, UNLOCKED_SECRET_LEN};
use crate::storage::{MintStore, StoreTransaction};
use log::*;
use std::sync::{Arc, Mutex, RwLock};

/// A signer holding the master key in-process.
///
/// Keysets are served from an immutable [`KeysetSnapshot`] that rotation replaces wholesale, so readers never see a
/// half-rotated state.
pub struct LocalSigner<S: MintStore> {
    store: Arc<S>,
    master: MasterKey,
    id_version: IdVersion,
    pubkey: CurvePoint,
    snapshot: RwLock<Arc<KeysetSnapshot>>,
    rotation: Mutex<()>,
}

impl<S: MintStore> LocalSigner<S> {
    /// Loads every stored seed and derives its keyset.
    ///
    /// Panics if a stored seed does not re-derive to its id under `master`.
    pub fn new(store: Arc<S>, master: MasterKey, id_version: IdVersion) -> Result<Self, SignerError> {
        let seeds = store.begin()?.get_all_seeds()?;
        let snapshot = KeysetSnapshot::from_seeds(&master, &seeds)?;
        let pubkey = master.signer_secret()?.public_key();
        info!("Signer {pubkey} loaded {} keysets", snapshot.len());
        Ok(Self {
            store,
            master,
            id_version,
            pubkey,
            snapshot: RwLock::new(Arc::new(snapshot)),
            rotation: Mutex::new(()),
        })
    }

    /// Creates a first keyset for every unit in `units` that has no active one yet.
    pub fn bootstrap(&self, units: &[Unit], input_fee_ppk: u64, expiry_limit_hours: u64) -> Result<Vec<KeysetInfo>, SignerError> {
        let snapshot = self.snapshot()?;
        let mut created = Vec::new();
        for unit in units {
            if snapshot.active_for(*unit).is_none() {
                created.push(self.rotate_keyset(RotateArgs { unit: *unit, input_fee_ppk, expiry_limit_hours })?);
            }
        }
        Ok(created)
    }

    pub fn snapshot(&self) -> Result<Arc<KeysetSnapshot>, SignerError> {
        self.snapshot.read().map(|s| Arc::clone(&s)).map_err(|_| SignerError::LockPoisoned)
    }
}

impl<S: MintStore> Signer for LocalSigner<S> {
    fn get_active_keys(&self) -> Result<Vec<KeysetKeys>, SignerError> {
        let snapshot = self.snapshot()?;
        let mut keys: Vec<KeysetKeys> = snapshot.active().map(|k| KeysetKeys::from(k.as_ref())).collect();
        keys.sort_by_key(|k| k.unit);
        Ok(keys)
    }

    fn get_keys_by_id(&self, id: &KeysetId) -> Result<KeysetKeys, SignerError> {
        let snapshot = self.snapshot()?;
        let keyset = snapshot.get(id).ok_or_else(|| SignerError::UnknownKeyset(id.clone()))?;
        Ok(KeysetKeys::from(keyset.as_ref()))
    }

    fn get_keysets(&self) -> Result<Vec<KeysetInfo>, SignerError> {
        let snapshot = self.snapshot()?;
        let mut infos: Vec<KeysetInfo> = snapshot.all().map(|k| KeysetInfo::from(&k.seed)).collect();
        infos.sort_by(|a, b| (a.unit, a.version).cmp(&(b.unit, b.version)));
        Ok(infos)
    }

    fn rotate_keyset(&self, args: RotateArgs) -> Result<KeysetInfo, SignerError> {
        let _rotating = self.rotation.lock().map_err(|_| SignerError::LockPoisoned)?;
        let mut tx = self.store.begin()?;
        let existing = tx.get_seeds(args.unit)?;
        let version = existing.iter().map(|s| s.version).max().map_or(0, |v| v + 1);
        let final_expiry = (args.expiry_limit_hours > 0).then(|| Timestamp::hours_from_now(args.expiry_limit_hours));
        let params = SeedParams { input_fee_ppk: args.input_fee_ppk, id_version: self.id_version, final_expiry };
        let seed = Seed::new(&self.master, args.unit, version, params)?;
        for old in existing.iter().filter(|s| s.active) {
            tx.set_seed_active(&old.id, false)?;
        }
        tx.save_seed(&seed)?;
        let snapshot = KeysetSnapshot::from_seeds(&self.master, &tx.get_all_seeds()?)?;
        tx.commit()?;

        let mut current = self.snapshot.write().map_err(|_| SignerError::LockPoisoned)?;
        *current = Arc::new(snapshot);
        info!("Rotated {} keyset to version {version}: {}", args.unit, seed.id);
        Ok(KeysetInfo::from(&seed))
    }

    fn sign_blind_messages(
        &self,
        messages: &[BlindedMessage],
    ) -> Result<(Vec<BlindSignature>, Vec<RecoverSig>), SignerError> {
        let snapshot = self.snapshot()?;
        let mut rng = rand::rng();
        let mut signatures = Vec::with_capacity(messages.len());
        let mut recovery = Vec::with_capacity(messages.len());
        for message in messages {
            let keyset = snapshot.get(&message.id).ok_or_else(|| SignerError::UnknownKeyset(message.id.clone()))?;
            if !keyset.is_active() {
                warn!("Refusing to sign with inactive keyset {}", message.id);
                return Err(SignerError::UsingInactiveKeyset(message.id.clone()));
            }
            let key = keyset
                .key(message.amount)
                .ok_or_else(|| SignerError::AmountNotInKeyset { id: message.id.clone(), amount: message.amount })?;
            let signed = bdhke::sign_blinded(&message.blinded, &key.secret);
            let dleq = generate_dleq(&mut rng, &message.blinded, &signed, &key.secret);
            let signature = BlindSignature { amount: message.amount, id: message.id.clone(), signed, dleq: Some(dleq) };
            recovery.push(RecoverSig::new(message, &signature));
            signatures.push(signature);
        }
        debug!("Signed {} blinded messages", signatures.len());
        Ok((signatures, recovery))
    }

    fn verify_proofs(
        &self,
        proofs: &[Proof],
        outputs: &[BlindedMessage],
        context: &SpendContext,
    ) -> Result<(), SignerError> {
        let snapshot = self.snapshot()?;
        let sig_all = requires_sig_all(proofs)?;
        if sig_all {
            debug!("Verifying SIG_ALL witness for a {context:?} request");
            let condition = verify_sig_all(proofs, &context.sig_all_message(proofs, outputs))?;
            let mut keys = condition.primary_keys()?;
            keys.extend(condition.refund_keys());
            verify_output_witnesses(outputs, &keys)?;
        }
        for proof in proofs {
            let (_, key) = snapshot
                .key(&proof.id, proof.amount)
                .ok_or_else(|| SignerError::KeysetForProofNotFound(proof.id.clone()))?;
            match Secret::parse(&proof.secret)? {
                Secret::Unlocked(s) if s.len() != UNLOCKED_SECRET_LEN => {
                    return Err(SpendConditionError::CommonSecretNotCorrectSize.into());
                }
                Secret::Unlocked(_) => {}
                // covered by the request-wide witness above
                Secret::Conditioned(_) if sig_all => {}
                Secret::Conditioned(condition) => {
                    let witness = Witness::parse(proof.witness.as_deref().unwrap_or_default())?;
                    verify_condition(&condition, proof.secret.as_bytes(), &witness)?;
                }
            }
            if !bdhke::verify(proof.secret.as_bytes(), &key.secret, &proof.c) {
                debug!("Proof for {} in keyset {} does not verify", proof.amount, proof.id);
                return Err(SignerError::InvalidProof);
            }
        }
        Ok(())
    }

    fn get_signer_pubkey(&self) -> Result<CurvePoint, SignerError> {
        Ok(self.pubkey)
    }
}
