//! RocksDB-backed persistent state store.
//!
//! One column family per key space. All mutations go through an atomic
//! [`WriteBatch`], so a [`StateBatch`] commits all-or-nothing — the
//! serializable per-key update model the engine depends on.
//!
//! Key encodings: participants by their 32 raw identity bytes;
//! competencies by big-endian id; assessment records by
//! `competency id (BE) || subject`; skill reputations by
//! `participant || competency id (BE)`. Big-endian ids keep prefix scans
//! ordered if they are ever needed.

use std::path::Path;

use rocksdb::{ColumnFamilyDescriptor, DB, Options, WriteBatch};

use attest_core::error::StoreError;
use attest_core::store::{StateBatch, StateStore, WriteOp};
use attest_core::types::{
    AssessmentRecord, Competency, CompetencyId, Participant, ParticipantId, SkillReputation,
};

// --- Column family names ---

const CF_PARTICIPANTS: &str = "participants";
const CF_COMPETENCIES: &str = "competencies";
const CF_RECORDS: &str = "records";
const CF_SKILL_REPUTATION: &str = "skill_reputation";
const CF_METADATA: &str = "metadata";

/// All column family names.
const ALL_CFS: &[&str] = &[
    CF_PARTICIPANTS,
    CF_COMPETENCIES,
    CF_RECORDS,
    CF_SKILL_REPUTATION,
    CF_METADATA,
];

// --- Metadata keys ---

const META_COMPETENCY_COUNT: &[u8] = b"competency_count";
const META_LEDGER_HEIGHT: &[u8] = b"ledger_height";
const META_ADMIN: &[u8] = b"admin";

/// RocksDB-backed persistent state store.
pub struct RocksStore {
    db: DB,
}

impl RocksStore {
    /// Open or create a database at the given path.
    ///
    /// Creates all column families if they don't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut db_opts = Options::default();
        db_opts.create_if_missing(true);
        db_opts.create_missing_column_families(true);

        let cf_descriptors: Vec<ColumnFamilyDescriptor> = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&db_opts, path.as_ref(), cf_descriptors)
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self { db })
    }

    /// Flush all in-memory buffers to disk.
    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush().map_err(|e| StoreError::Backend(e.to_string()))
    }

    // --- Deployment metadata ---

    /// Current ledger height. Starts at zero for a fresh database.
    pub fn height(&self) -> Result<u64, StoreError> {
        self.get_meta_u64(META_LEDGER_HEIGHT)
    }

    /// Advance the ledger height by one and return the new value.
    ///
    /// The height is a monotonic non-decreasing counter read at
    /// assessment-open time; the front end advances it once per mutating
    /// command.
    pub fn advance_height(&mut self) -> Result<u64, StoreError> {
        let next = self.height()? + 1;
        let cf = self.cf_handle(CF_METADATA)?;
        self.db
            .put_cf(&cf, META_LEDGER_HEIGHT, next.to_le_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(next)
    }

    /// The pinned administrator identity, if one has been set.
    pub fn admin(&self) -> Result<Option<ParticipantId>, StoreError> {
        let cf = self.cf_handle(CF_METADATA)?;
        match self
            .db
            .get_cf(&cf, META_ADMIN)
            .map_err(|e| StoreError::Backend(e.to_string()))?
        {
            Some(bytes) => {
                let raw: [u8; 32] = bytes
                    .try_into()
                    .map_err(|_| StoreError::Corrupt("admin".into()))?;
                Ok(Some(ParticipantId::from_bytes(raw)))
            }
            None => Ok(None),
        }
    }

    /// Pin the administrator identity. Refuses to overwrite a different one.
    pub fn set_admin(&mut self, admin: &ParticipantId) -> Result<(), StoreError> {
        if let Some(existing) = self.admin()? {
            if existing != *admin {
                return Err(StoreError::Backend(format!(
                    "administrator already pinned to {existing}"
                )));
            }
            return Ok(());
        }
        let cf = self.cf_handle(CF_METADATA)?;
        self.db
            .put_cf(&cf, META_ADMIN, admin.as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))
    }

    // --- Internal helpers ---

    fn cf_handle(&self, name: &str) -> Result<&rocksdb::ColumnFamily, StoreError> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Backend(format!("missing column family: {name}")))
    }

    fn get_meta_u64(&self, key: &[u8]) -> Result<u64, StoreError> {
        let cf = self.cf_handle(CF_METADATA)?;
        match self
            .db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Backend(e.to_string()))?
        {
            Some(bytes) if bytes.len() == 8 => Ok(u64::from_le_bytes(bytes.try_into().unwrap())),
            Some(_) => Err(StoreError::Corrupt(String::from_utf8_lossy(key).into_owned())),
            None => Ok(0),
        }
    }

    fn encode<T: bincode::Encode>(value: &T, key: &str) -> Result<Vec<u8>, StoreError> {
        bincode::encode_to_vec(value, bincode::config::standard())
            .map_err(|_| StoreError::Corrupt(key.to_string()))
    }

    fn decode<T: bincode::Decode<()>>(bytes: &[u8], key: &str) -> Result<T, StoreError> {
        bincode::decode_from_slice(bytes, bincode::config::standard())
            .map(|(value, _)| value)
            .map_err(|_| StoreError::Corrupt(key.to_string()))
    }

    fn get_decoded<T: bincode::Decode<()>>(
        &self,
        cf_name: &str,
        key: &[u8],
        label: &str,
    ) -> Result<Option<T>, StoreError> {
        let cf = self.cf_handle(cf_name)?;
        match self
            .db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Backend(e.to_string()))?
        {
            Some(bytes) => Ok(Some(Self::decode(&bytes, label)?)),
            None => Ok(None),
        }
    }

    /// Record key: `competency id (BE) || subject`.
    fn record_key(competency_id: CompetencyId, subject: &ParticipantId) -> [u8; 40] {
        let mut key = [0u8; 40];
        key[0..8].copy_from_slice(&competency_id.to_be_bytes());
        key[8..40].copy_from_slice(subject.as_bytes());
        key
    }

    /// Skill reputation key: `participant || competency id (BE)`.
    fn skill_key(participant: &ParticipantId, competency_id: CompetencyId) -> [u8; 40] {
        let mut key = [0u8; 40];
        key[0..32].copy_from_slice(participant.as_bytes());
        key[32..40].copy_from_slice(&competency_id.to_be_bytes());
        key
    }
}

impl StateStore for RocksStore {
    fn get_participant(&self, id: &ParticipantId) -> Result<Option<Participant>, StoreError> {
        self.get_decoded(CF_PARTICIPANTS, id.as_bytes(), "participant")
    }

    fn get_competency(&self, id: CompetencyId) -> Result<Option<Competency>, StoreError> {
        self.get_decoded(CF_COMPETENCIES, &id.to_be_bytes(), "competency")
    }

    fn competency_count(&self) -> Result<u64, StoreError> {
        self.get_meta_u64(META_COMPETENCY_COUNT)
    }

    fn get_record(
        &self,
        competency_id: CompetencyId,
        subject: &ParticipantId,
    ) -> Result<Option<AssessmentRecord>, StoreError> {
        self.get_decoded(CF_RECORDS, &Self::record_key(competency_id, subject), "record")
    }

    fn get_skill_reputation(
        &self,
        participant: &ParticipantId,
        competency_id: CompetencyId,
    ) -> Result<Option<SkillReputation>, StoreError> {
        self.get_decoded(
            CF_SKILL_REPUTATION,
            &Self::skill_key(participant, competency_id),
            "skill reputation",
        )
    }

    fn apply(&mut self, batch: StateBatch) -> Result<(), StoreError> {
        let cf_participants = self.cf_handle(CF_PARTICIPANTS)?;
        let cf_competencies = self.cf_handle(CF_COMPETENCIES)?;
        let cf_records = self.cf_handle(CF_RECORDS)?;
        let cf_skill = self.cf_handle(CF_SKILL_REPUTATION)?;
        let cf_meta = self.cf_handle(CF_METADATA)?;

        let mut competency_count = self.competency_count()?;
        let ops = batch.len();
        let mut wb = WriteBatch::default();

        for op in batch.0 {
            match op {
                WriteOp::Participant(p) => {
                    wb.put_cf(cf_participants, p.id.as_bytes(), Self::encode(&p, "participant")?);
                }
                WriteOp::Competency(c) => {
                    // Ids are dense, so the count is one past the highest id.
                    competency_count = competency_count.max(c.id + 1);
                    wb.put_cf(cf_competencies, c.id.to_be_bytes(), Self::encode(&c, "competency")?);
                    wb.put_cf(cf_meta, META_COMPETENCY_COUNT, competency_count.to_le_bytes());
                }
                WriteOp::Record(r) => {
                    let key = Self::record_key(r.competency_id, &r.subject);
                    wb.put_cf(cf_records, key, Self::encode(&r, "record")?);
                }
                WriteOp::SkillReputation(s) => {
                    let key = Self::skill_key(&s.participant, s.competency_id);
                    wb.put_cf(cf_skill, key, Self::encode(&s, "skill reputation")?);
                }
            }
        }

        self.db
            .write(wb)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        tracing::debug!(ops, "state batch committed");
        Ok(())
    }
}
