//! # Publications File
//!
//! Trust anchor distributed by the KSI service: the list of published
//! calendar roots and the certificates allowed to sign calendar
//! authentication records, all covered by one CMS signature.

use ksi_crypto::CryptoProvider;
use ksi_tlv::{unknown_child, ChildCounter, Tag, TlvReader};

use super::constants::{publication_record as pr, publications_file as pf};
use super::errors::{Result, SignatureError};
use super::publication::PublicationRecord;

/// Certificate record (TLV 0x702).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertificateRecord {
    certificate_id: Vec<u8>,
    x509_certificate: Vec<u8>,
}

impl CertificateRecord {
    /// Create a record.
    pub fn new(certificate_id: Vec<u8>, x509_certificate: Vec<u8>) -> Self {
        Self {
            certificate_id,
            x509_certificate,
        }
    }

    /// Parse a certificate record tag.
    pub fn from_tag(tag: &Tag) -> Result<Self> {
        tag.expect_type(pf::CERTIFICATE_RECORD)?;
        let mut counter = ChildCounter::new(pf::CERTIFICATE_RECORD);
        let (mut id, mut certificate) = (None, None);
        for child in tag.children()? {
            counter.add(child.tag_type());
            match child.tag_type() {
                pf::CERTIFICATE_ID => id = Some(child.as_bytes()?),
                pf::X509_CERTIFICATE => certificate = Some(child.as_bytes()?),
                _ => unknown_child(pf::CERTIFICATE_RECORD, &child)?,
            }
        }
        Ok(Self {
            certificate_id: counter.required(pf::CERTIFICATE_ID, id)?,
            x509_certificate: counter.required(pf::X509_CERTIFICATE, certificate)?,
        })
    }

    /// Certificate id referenced by signature data.
    pub fn certificate_id(&self) -> &[u8] {
        &self.certificate_id
    }

    /// DER-encoded X.509 certificate.
    pub fn x509_certificate(&self) -> &[u8] {
        &self.x509_certificate
    }

    /// TLV form.
    pub fn to_tag(&self) -> Tag {
        Tag::composite(
            pf::CERTIFICATE_RECORD,
            false,
            false,
            vec![
                Tag::raw(pf::CERTIFICATE_ID, false, false, self.certificate_id.clone()),
                Tag::raw(pf::X509_CERTIFICATE, false, false, self.x509_certificate.clone()),
            ],
        )
    }
}

/// Publications file header (TLV 0x701).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicationsFileHeader {
    /// Format version.
    pub version: u64,
    /// Creation time, seconds since the epoch.
    pub creation_time: u64,
    /// Canonical download location.
    pub repository_uri: Option<String>,
}

impl PublicationsFileHeader {
    fn from_tag(tag: &Tag) -> Result<Self> {
        let mut counter = ChildCounter::new(pf::HEADER);
        let (mut version, mut creation_time, mut repository_uri) = (None, None, None);
        for child in tag.children()? {
            counter.add(child.tag_type());
            match child.tag_type() {
                pf::HEADER_VERSION => version = Some(child.as_u64()?),
                pf::HEADER_CREATION_TIME => creation_time = Some(child.as_u64()?),
                pf::HEADER_REPOSITORY_URI => repository_uri = Some(child.as_string()?),
                _ => unknown_child(pf::HEADER, &child)?,
            }
        }
        Ok(Self {
            version: counter.required(pf::HEADER_VERSION, version)?,
            creation_time: counter.required(pf::HEADER_CREATION_TIME, creation_time)?,
            repository_uri: counter.optional(pf::HEADER_REPOSITORY_URI, repository_uri)?,
        })
    }

    /// TLV form.
    pub fn to_tag(&self) -> Tag {
        let mut children = vec![
            Tag::integer(pf::HEADER_VERSION, false, false, self.version),
            Tag::integer(pf::HEADER_CREATION_TIME, false, false, self.creation_time),
        ];
        if let Some(uri) = &self.repository_uri {
            children.push(Tag::string(pf::HEADER_REPOSITORY_URI, false, false, uri.clone()));
        }
        Tag::composite(pf::HEADER, false, false, children)
    }
}

/// Parsed publications file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicationsFile {
    header: PublicationsFileHeader,
    certificates: Vec<CertificateRecord>,
    publications: Vec<PublicationRecord>,
    cms_signature: Vec<u8>,
    signed_bytes: Vec<u8>,
}

impl PublicationsFile {
    /// Parse `KSIPUBLF` followed by the file's TLV elements.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let body = bytes
            .strip_prefix(pf::MAGIC.as_slice())
            .ok_or_else(|| invalid("missing KSIPUBLF magic"))?;

        let mut reader = TlvReader::new(body);
        let mut header = None;
        let mut certificates = Vec::new();
        let mut publications = Vec::new();
        let mut cms = None;

        loop {
            let offset = bytes.len() - reader.get_ref().len();
            let Some(tag) = reader.read_tag()? else {
                break;
            };
            if cms.is_some() {
                return Err(invalid("CMS signature must be the last element"));
            }
            match tag.tag_type() {
                pf::HEADER => {
                    if header.is_some() || offset != pf::MAGIC.len() {
                        return Err(invalid("header must be the first and only header element"));
                    }
                    header = Some(PublicationsFileHeader::from_tag(&tag)?);
                }
                pf::CERTIFICATE_RECORD => certificates.push(CertificateRecord::from_tag(&tag)?),
                pr::PUBLICATIONS_FILE_TAG_TYPE => publications.push(PublicationRecord::from_tag(&tag)?),
                pf::CMS_SIGNATURE => cms = Some((tag.as_bytes()?, offset)),
                _ => unknown_child(0, &tag)?,
            }
        }

        let header = header.ok_or_else(|| invalid("missing header"))?;
        let (cms_signature, signed_len) = cms.ok_or_else(|| invalid("missing CMS signature"))?;

        Ok(Self {
            header,
            certificates,
            publications,
            cms_signature,
            signed_bytes: bytes[..signed_len].to_vec(),
        })
    }

    /// Assemble and encode a file; `cms_signature` is taken as given.
    pub fn build(
        header: PublicationsFileHeader,
        certificates: Vec<CertificateRecord>,
        publications: Vec<PublicationRecord>,
        cms_signature: Vec<u8>,
    ) -> Result<Vec<u8>> {
        let mut out = pf::MAGIC.to_vec();
        out.extend(header.to_tag().encode()?);
        for certificate in &certificates {
            out.extend(certificate.to_tag().encode()?);
        }
        for publication in &publications {
            out.extend(publication.tag().encode()?);
        }
        out.extend(Tag::raw(pf::CMS_SIGNATURE, false, false, cms_signature).encode()?);
        Ok(out)
    }

    /// Header.
    pub fn header(&self) -> &PublicationsFileHeader {
        &self.header
    }

    /// Certificate records.
    pub fn certificates(&self) -> &[CertificateRecord] {
        &self.certificates
    }

    /// Publication records in file order.
    pub fn publications(&self) -> &[PublicationRecord] {
        &self.publications
    }

    /// CMS signature bytes.
    pub fn cms_signature(&self) -> &[u8] {
        &self.cms_signature
    }

    /// Bytes covered by the CMS signature (magic through the last record).
    pub fn signed_bytes(&self) -> &[u8] {
        &self.signed_bytes
    }

    /// True when the file lists the same publication (time and hash).
    pub fn contains(&self, record: &PublicationRecord) -> bool {
        self.publications
            .iter()
            .any(|p| p.publication_data().same_publication(record.publication_data()))
    }

    /// Earliest publication at or after `time`.
    pub fn nearest_publication_after(&self, time: u64) -> Option<&PublicationRecord> {
        self.publications
            .iter()
            .filter(|p| p.publication_data().publication_time() >= time)
            .min_by_key(|p| p.publication_data().publication_time())
    }

    /// Most recent publication.
    pub fn latest_publication(&self) -> Option<&PublicationRecord> {
        self.publications
            .iter()
            .max_by_key(|p| p.publication_data().publication_time())
    }

    /// Certificate with the given id.
    pub fn find_certificate_by_id(&self, certificate_id: &[u8]) -> Option<&CertificateRecord> {
        self.certificates
            .iter()
            .find(|c| c.certificate_id() == certificate_id)
    }

    /// Check the file's CMS signature with `provider`.
    pub fn verify(&self, provider: &dyn CryptoProvider) -> Result<()> {
        provider.verify_pkcs_signature(&self.signed_bytes, &self.cms_signature, &[])?;
        Ok(())
    }
}

fn invalid(reason: &str) -> SignatureError {
    SignatureError::InvalidPublicationsFile(reason.to_string())
}
