use super::*;

const TAG_CPRT: u32 = 0x6370_7274; // 'cprt', absent from the synthetic profile

#[test]
fn srgb_profile_parses() {
    let profile = Profile::srgb();
    let reparsed = Profile::parse(profile.data()).unwrap();
    assert_eq!(reparsed.len(), profile.len());
    assert!(reparsed.is_rgb());
    assert!(!reparsed.is_pcs_only());
    assert_eq!(reparsed.pcs(), 0x5859_5a20); // 'XYZ '
    assert_eq!(reparsed.tag_count(), 7);
}

#[test]
fn truncated_bytes_are_invalid() {
    assert!(matches!(
        Profile::parse(&[0u8; 16]),
        Err(RasterkitError::InvalidProfile(_))
    ));
}

#[test]
fn size_field_must_match_data_length() {
    let mut bytes = Profile::srgb().data().to_vec();
    bytes.push(0);
    assert!(matches!(
        Profile::parse(&bytes),
        Err(RasterkitError::InvalidProfile(_))
    ));
}

#[test]
fn missing_acsp_signature_is_invalid() {
    let mut bytes = Profile::srgb().data().to_vec();
    bytes[36] = b'x';
    assert!(matches!(
        Profile::parse(&bytes),
        Err(RasterkitError::InvalidProfile(_))
    ));
}

#[test]
fn out_of_bounds_tag_is_invalid() {
    let mut bytes = Profile::srgb().data().to_vec();
    let len = bytes.len() as u32;
    // Point the first tag entry past the end of the data.
    bytes[136..140].copy_from_slice(&len.to_be_bytes());
    assert!(matches!(
        Profile::parse(&bytes),
        Err(RasterkitError::InvalidProfile(_))
    ));
}

#[test]
fn tag_reads_resolve_payloads() {
    let profile = Profile::srgb();
    assert_eq!(profile.tag_size(TAG_WTPT).unwrap(), 20);
    let wtpt = profile.tag_data(TAG_WTPT).unwrap();
    assert_eq!(&wtpt[0..4], b"XYZ ");
}

#[test]
fn absent_tag_is_tag_not_found() {
    let profile = Profile::srgb();
    assert!(matches!(
        profile.tag_size(TAG_CPRT),
        Err(RasterkitError::TagNotFound(_))
    ));
    assert!(matches!(
        profile.tag_data(TAG_CPRT),
        Err(RasterkitError::TagNotFound(_))
    ));
}

#[test]
fn header_pseudo_tag_is_fixed_size() {
    let profile = Profile::srgb();
    assert_eq!(profile.tag_size(TAG_HEAD).unwrap(), HEADER_LEN);
    assert_eq!(profile.tag_data(TAG_HEAD).unwrap().len(), HEADER_LEN);
}

#[test]
fn replacing_a_tag_shifts_later_offsets() {
    let mut profile = Profile::srgb();
    let old_len = profile.len();
    let g_before = profile.tag_data(TAG_G_XYZ).unwrap().to_vec();
    let trc_before = profile.tag_data(TAG_B_TRC).unwrap().to_vec();

    let mut grown = profile.tag_data(TAG_R_XYZ).unwrap().to_vec();
    grown.extend_from_slice(&[0xaa; 4]);
    profile.set_tag_data(TAG_R_XYZ, &grown).unwrap();

    assert_eq!(profile.len(), old_len + 4);
    assert_eq!(profile.tag_size(TAG_R_XYZ).unwrap(), grown.len());
    assert_eq!(profile.tag_data(TAG_R_XYZ).unwrap(), &grown[..]);
    // Later tags moved but kept their bytes.
    assert_eq!(profile.tag_data(TAG_G_XYZ).unwrap(), &g_before[..]);
    assert_eq!(profile.tag_data(TAG_B_TRC).unwrap(), &trc_before[..]);
    // The rebuilt layout is still a valid profile.
    Profile::parse(profile.data()).unwrap();
}

#[test]
fn shrinking_a_tag_also_rebuilds() {
    let mut profile = Profile::srgb();
    let old_len = profile.len();
    let wtpt_before = profile.tag_data(TAG_WTPT).unwrap().to_vec();

    profile.set_tag_data(TAG_R_TRC, &[0u8; 8]).unwrap();
    assert_eq!(profile.len(), old_len - 6);
    assert_eq!(profile.tag_data(TAG_WTPT).unwrap(), &wtpt_before[..]);
    Profile::parse(profile.data()).unwrap();
}

#[test]
fn header_tag_rejected_on_generic_path() {
    let mut profile = Profile::srgb();
    assert!(matches!(
        profile.set_tag_data(TAG_HEAD, &[0u8; 128]),
        Err(RasterkitError::TagWriteRejected(_))
    ));
}

#[test]
fn replacing_absent_tag_is_tag_not_found() {
    let mut profile = Profile::srgb();
    assert!(matches!(
        profile.set_tag_data(TAG_CPRT, &[0u8; 4]),
        Err(RasterkitError::TagNotFound(_))
    ));
}

#[test]
fn set_header_requires_exact_length() {
    let mut profile = Profile::srgb();
    assert!(matches!(
        profile.set_header(&[0u8; 100]),
        Err(RasterkitError::TagWriteRejected(_))
    ));
}

#[test]
fn set_header_keeps_size_field_authoritative() {
    let mut profile = Profile::srgb();
    let mut header = [0u8; HEADER_LEN];
    header.copy_from_slice(profile.tag_data(TAG_HEAD).unwrap());
    // Scribble over the size field and change the device class.
    header[0..4].copy_from_slice(&0u32.to_be_bytes());
    header[12..16].copy_from_slice(b"scnr");
    profile.set_header(&header).unwrap();

    assert_eq!(profile.device_class(), u32::from_be_bytes(*b"scnr"));
    // Size field restored, so the profile still parses.
    Profile::parse(profile.data()).unwrap();
}
